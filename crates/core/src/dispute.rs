//! Dispute workflow: challenge a non-confirmed verdict and adjudicate it.
//!
//! ```text
//! (none) -> open -> under_review -> accepted | rejected
//!              \____________________/
//! ```
//!
//! A record holds at most one unresolved dispute. Once a dispute is resolved
//! a new one may be opened, unless the record ended up confirmed.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::record::{AttendanceRecord, AuditEvent, StatusOverride};
use crate::types::{DbId, DisputeId, OccurrenceId, Timestamp};
use crate::verdict::AttendanceStatus;

/// Maximum length for an attachment file name or URL.
pub const MAX_ATTACHMENT_FIELD_LENGTH: usize = 2_048;

/// Maximum length for a resolver comment.
pub const MAX_RESOLVER_COMMENT_LENGTH: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeReason {
    Illness,
    TechnicalFailure,
    ScheduleChange,
    Substitution,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    UnderReview,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeOutcome {
    Accept,
    Reject,
}

impl DisputeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::UnderReview => "under_review",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Statuses reachable from `self`. Resolved disputes are terminal.
    pub fn valid_transitions(&self) -> &'static [DisputeStatus] {
        match self {
            Self::Open => &[Self::UnderReview, Self::Accepted, Self::Rejected],
            Self::UnderReview => &[Self::Accepted, Self::Rejected],
            Self::Accepted | Self::Rejected => &[],
        }
    }

    pub fn can_transition(&self, to: DisputeStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DisputeOutcome {
    fn status(&self) -> DisputeStatus {
        match self {
            Self::Accept => DisputeStatus::Accepted,
            Self::Reject => DisputeStatus::Rejected,
        }
    }
}

/// Input for opening a dispute.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDispute {
    pub record_id: OccurrenceId,
    pub raised_by: DbId,
    /// Set when someone other than the teacher files on their behalf.
    #[serde(default)]
    pub on_behalf: bool,
    pub reason: DisputeReason,
    pub description: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub record_id: OccurrenceId,
    pub raised_by: DbId,
    pub on_behalf: bool,
    pub reason: DisputeReason,
    pub description: String,
    pub attachments: Vec<Attachment>,
    pub status: DisputeStatus,
    pub reviewer: Option<DbId>,
    pub created_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub resolved_by: Option<DbId>,
    pub resolver_comment: Option<String>,
    /// Record status at the moment the dispute was opened.
    pub contested_status: AttendanceStatus,
}

/* --------------------------------------------------------------------------
Validation
-------------------------------------------------------------------------- */

pub fn validate_new_dispute(input: &NewDispute, config: &EngineConfig) -> Result<(), CoreError> {
    let description_len = input.description.trim().chars().count();
    if description_len < config.min_description_len {
        return Err(CoreError::Validation(format!(
            "Description must be at least {} characters, got {description_len}",
            config.min_description_len
        )));
    }
    if description_len > config.max_description_len {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {} characters",
            config.max_description_len
        )));
    }
    if input.attachments.len() > config.max_attachments {
        return Err(CoreError::Validation(format!(
            "At most {} attachments are allowed, got {}",
            config.max_attachments,
            input.attachments.len()
        )));
    }
    for (i, attachment) in input.attachments.iter().enumerate() {
        validate_attachment(attachment)
            .map_err(|msg| CoreError::Validation(format!("Attachment {i}: {msg}")))?;
    }
    Ok(())
}

fn validate_attachment(attachment: &Attachment) -> Result<(), String> {
    if attachment.file_name.trim().is_empty() {
        return Err("file name must not be empty".to_string());
    }
    if attachment.url.trim().is_empty() {
        return Err("url must not be empty".to_string());
    }
    if attachment.file_name.chars().count() > MAX_ATTACHMENT_FIELD_LENGTH
        || attachment.url.chars().count() > MAX_ATTACHMENT_FIELD_LENGTH
    {
        return Err(format!(
            "file name and url must not exceed {MAX_ATTACHMENT_FIELD_LENGTH} characters"
        ));
    }
    Ok(())
}

fn validate_resolver_comment(comment: &str) -> Result<(), CoreError> {
    if comment.trim().is_empty() {
        return Err(CoreError::Validation(
            "A resolution must include a comment".to_string(),
        ));
    }
    if comment.trim().chars().count() > MAX_RESOLVER_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Resolver comment exceeds maximum length of {MAX_RESOLVER_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Transitions
-------------------------------------------------------------------------- */

/// Open a dispute against `record`. Must run under the record's lock.
pub fn open(
    record: &mut AttendanceRecord,
    input: NewDispute,
    config: &EngineConfig,
    id: DisputeId,
    now: Timestamp,
) -> Result<Dispute, CoreError> {
    record.settle(now);
    let status = record.status(now);

    if status == AttendanceStatus::Confirmed {
        return Err(CoreError::InvalidRecord(format!(
            "Record {} is confirmed; there is nothing to dispute",
            record.id()
        )));
    }
    if let Some(active) = record.active_dispute() {
        return Err(CoreError::InvalidState(format!(
            "Record {} already has an unresolved dispute {} ({})",
            record.id(),
            active.id,
            active.status
        )));
    }
    if !status.is_terminal() {
        return Err(CoreError::InvalidState(format!(
            "Record {} has no verdict yet; its check-in window is still open",
            record.id()
        )));
    }
    if !input.on_behalf && input.raised_by != record.occurrence.teacher_id {
        return Err(CoreError::Forbidden(format!(
            "User {} is not the teacher of occurrence {}",
            input.raised_by,
            record.id()
        )));
    }
    validate_new_dispute(&input, config)?;

    let dispute = Dispute {
        id,
        record_id: record.id(),
        raised_by: input.raised_by,
        on_behalf: input.on_behalf,
        reason: input.reason,
        description: input.description.trim().to_string(),
        attachments: input.attachments,
        status: DisputeStatus::Open,
        reviewer: None,
        created_at: now,
        reviewed_at: None,
        resolved_at: None,
        resolved_by: None,
        resolver_comment: None,
        contested_status: status,
    };

    record.disputes.push(dispute.clone());
    record.push_audit(
        now,
        Some(dispute.raised_by),
        AuditEvent::DisputeOpened { dispute_id: id },
    );
    Ok(dispute)
}

/// Claim a dispute for review.
///
/// Idempotent for the reviewer already assigned; any other reviewer gets
/// [`CoreError::Conflict`].
pub fn mark_under_review(
    record: &mut AttendanceRecord,
    dispute_id: DisputeId,
    reviewer: DbId,
    now: Timestamp,
) -> Result<Dispute, CoreError> {
    let dispute = record
        .dispute_mut(dispute_id)
        .ok_or_else(|| CoreError::not_found("Dispute", dispute_id))?;

    if dispute.status.is_resolved() {
        return Err(CoreError::AlreadyResolved(dispute_id));
    }
    if reviewer == dispute.raised_by {
        return Err(CoreError::Forbidden(
            "A dispute cannot be reviewed by the person who raised it".to_string(),
        ));
    }
    if dispute.status == DisputeStatus::UnderReview {
        return match dispute.reviewer {
            Some(current) if current == reviewer => Ok(dispute.clone()),
            Some(current) => Err(CoreError::Conflict(format!(
                "Dispute {dispute_id} is already under review by user {current}"
            ))),
            None => Err(CoreError::InvalidState(format!(
                "Dispute {dispute_id} is under review without a reviewer"
            ))),
        };
    }

    debug_assert!(dispute.status.can_transition(DisputeStatus::UnderReview));
    dispute.status = DisputeStatus::UnderReview;
    dispute.reviewer = Some(reviewer);
    dispute.reviewed_at = Some(now);
    let snapshot = dispute.clone();

    record.push_audit(
        now,
        Some(reviewer),
        AuditEvent::DisputeUnderReview { dispute_id },
    );
    Ok(snapshot)
}

/// Resolve a dispute. Terminal.
///
/// `accept` overrides the record status to confirmed while keeping the
/// machine verdict; `reject` leaves the status as it was.
pub fn resolve(
    record: &mut AttendanceRecord,
    dispute_id: DisputeId,
    resolver: DbId,
    outcome: DisputeOutcome,
    comment: &str,
    now: Timestamp,
) -> Result<Dispute, CoreError> {
    let dispute = record
        .dispute_mut(dispute_id)
        .ok_or_else(|| CoreError::not_found("Dispute", dispute_id))?;

    if dispute.status.is_resolved() {
        return Err(CoreError::AlreadyResolved(dispute_id));
    }
    if resolver == dispute.raised_by {
        return Err(CoreError::Forbidden(
            "A dispute cannot be resolved by the person who raised it".to_string(),
        ));
    }
    if let Some(current) = dispute.reviewer {
        if current != resolver {
            return Err(CoreError::Conflict(format!(
                "Dispute {dispute_id} is assigned to reviewer {current}"
            )));
        }
    }
    validate_resolver_comment(comment)?;

    let target = outcome.status();
    if !dispute.status.can_transition(target) {
        return Err(CoreError::InvalidState(format!(
            "Invalid transition: {} -> {target}",
            dispute.status
        )));
    }

    let comment = comment.trim().to_string();
    dispute.status = target;
    dispute.reviewer.get_or_insert(resolver);
    dispute.resolved_at = Some(now);
    dispute.resolved_by = Some(resolver);
    dispute.resolver_comment = Some(comment.clone());
    let snapshot = dispute.clone();

    record.push_audit(
        now,
        Some(resolver),
        AuditEvent::DisputeResolved {
            dispute_id,
            outcome,
        },
    );

    match outcome {
        DisputeOutcome::Accept => {
            let from = record.status(now);
            record.status_override = Some(StatusOverride {
                status: AttendanceStatus::Confirmed,
                dispute_id,
                decided_by: resolver,
                decided_at: now,
                note: comment.clone(),
            });
            record.comment = Some(format!("Dispute accepted: {comment}"));
            record.push_audit(
                now,
                Some(resolver),
                AuditEvent::StatusOverridden {
                    from,
                    to: AttendanceStatus::Confirmed,
                },
            );
        }
        DisputeOutcome::Reject => {
            record.comment = Some(format!("Dispute rejected: {comment}"));
        }
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::fixtures::lesson;
    use crate::signal::{register, Evidence, SignalKind};
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    const TEACHER: DbId = 10;
    const REVIEWER: DbId = 99;

    fn at(hh: u32, mm: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 9, 2, hh, mm, 0).unwrap()
    }

    fn absent_record() -> AttendanceRecord {
        let mut rec =
            AttendanceRecord::new(lesson(1, TEACHER, "Chemistry", 8, 0), &EngineConfig::default(), at(7, 0))
                .unwrap();
        rec.settle(at(8, 5));
        rec
    }

    fn illness() -> NewDispute {
        NewDispute {
            record_id: 1,
            raised_by: TEACHER,
            on_behalf: false,
            reason: DisputeReason::Illness,
            description: "I was at the clinic, certificate attached.".to_string(),
            attachments: vec![Attachment {
                file_name: "certificate.pdf".to_string(),
                url: "https://files.example/certificate.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
            }],
        }
    }

    fn open_one(rec: &mut AttendanceRecord) -> Dispute {
        open(rec, illness(), &EngineConfig::default(), Uuid::now_v7(), at(9, 0)).unwrap()
    }

    // -----------------------------------------------------------------------
    // State machine table
    // -----------------------------------------------------------------------

    #[test]
    fn resolved_states_have_no_transitions() {
        assert!(DisputeStatus::Accepted.valid_transitions().is_empty());
        assert!(DisputeStatus::Rejected.valid_transitions().is_empty());
    }

    #[test]
    fn under_review_cannot_go_back_to_open() {
        assert!(!DisputeStatus::UnderReview.can_transition(DisputeStatus::Open));
        assert!(!DisputeStatus::Accepted.can_transition(DisputeStatus::UnderReview));
    }

    // -----------------------------------------------------------------------
    // Opening
    // -----------------------------------------------------------------------

    #[test]
    fn open_against_absent_record() {
        let mut rec = absent_record();
        let dispute = open_one(&mut rec);
        assert_eq!(dispute.status, DisputeStatus::Open);
        assert_eq!(dispute.contested_status, AttendanceStatus::Absent);
        assert!(rec.is_frozen());
        assert_eq!(rec.view(at(9, 0)).dispute_ref, Some(dispute.id));
    }

    #[test]
    fn short_description_rejected() {
        let mut rec = absent_record();
        let mut input = illness();
        input.description = "too short".to_string();
        assert_matches!(
            open(&mut rec, input, &EngineConfig::default(), Uuid::now_v7(), at(9, 0)),
            Err(CoreError::Validation(_))
        );
        assert!(rec.disputes.is_empty());
    }

    #[test]
    fn description_minimum_is_inclusive() {
        let mut rec = absent_record();
        let mut input = illness();
        input.description = "a".repeat(19);
        assert_matches!(
            open(&mut rec, input, &EngineConfig::default(), Uuid::now_v7(), at(9, 0)),
            Err(CoreError::Validation(msg)) if msg.contains("got 19")
        );

        let mut input = illness();
        input.description = "a".repeat(20);
        let dispute = open(&mut rec, input, &EngineConfig::default(), Uuid::now_v7(), at(9, 0)).unwrap();
        assert_eq!(dispute.description.chars().count(), 20);
    }

    #[test]
    fn description_counts_characters_not_bytes() {
        let mut rec = absent_record();
        let mut input = illness();
        // 20 characters, 40 bytes.
        input.description = "ж".repeat(20);
        assert!(open(&mut rec, input, &EngineConfig::default(), Uuid::now_v7(), at(9, 0)).is_ok());
    }

    #[test]
    fn attachment_fields_count_characters() {
        let mut rec = absent_record();
        let mut input = illness();
        input.attachments[0].file_name = "é".repeat(MAX_ATTACHMENT_FIELD_LENGTH);
        assert!(validate_new_dispute(&input, &EngineConfig::default()).is_ok());

        input.attachments[0].file_name = "é".repeat(MAX_ATTACHMENT_FIELD_LENGTH + 1);
        assert_matches!(
            open(&mut rec, input, &EngineConfig::default(), Uuid::now_v7(), at(9, 0)),
            Err(CoreError::Validation(msg)) if msg.starts_with("Attachment 0")
        );
    }

    #[test]
    fn whitespace_padding_does_not_count() {
        let mut rec = absent_record();
        let mut input = illness();
        input.description = format!("{:^40}", "short");
        assert_matches!(
            open(&mut rec, input, &EngineConfig::default(), Uuid::now_v7(), at(9, 0)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn too_many_attachments_rejected() {
        let mut rec = absent_record();
        let mut input = illness();
        let one = input.attachments[0].clone();
        input.attachments = vec![one; 11];
        assert_matches!(
            open(&mut rec, input, &EngineConfig::default(), Uuid::now_v7(), at(9, 0)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn confirmed_record_cannot_be_disputed() {
        let mut rec =
            AttendanceRecord::new(lesson(1, TEACHER, "Chemistry", 8, 0), &EngineConfig::default(), at(7, 0))
                .unwrap();
        register(&mut rec, SignalKind::Qr, Evidence::from_source("gate"), at(7, 55));
        register(&mut rec, SignalKind::Biometric, Evidence::from_source("cam"), at(7, 56));
        assert_matches!(
            open(&mut rec, illness(), &EngineConfig::default(), Uuid::now_v7(), at(9, 0)),
            Err(CoreError::InvalidRecord(_))
        );
    }

    #[test]
    fn pending_record_cannot_be_disputed() {
        let mut rec =
            AttendanceRecord::new(lesson(1, TEACHER, "Chemistry", 8, 0), &EngineConfig::default(), at(7, 0))
                .unwrap();
        let result = open(&mut rec, illness(), &EngineConfig::default(), Uuid::now_v7(), at(7, 58));
        assert_matches!(result, Err(CoreError::InvalidState(_)));
    }

    #[test]
    fn second_open_dispute_rejected() {
        let mut rec = absent_record();
        open_one(&mut rec);
        assert_matches!(
            open(&mut rec, illness(), &EngineConfig::default(), Uuid::now_v7(), at(9, 1)),
            Err(CoreError::InvalidState(_))
        );
    }

    #[test]
    fn other_user_needs_proxy_flag() {
        let mut rec = absent_record();
        let mut input = illness();
        input.raised_by = 555;
        assert_matches!(
            open(&mut rec, input.clone(), &EngineConfig::default(), Uuid::now_v7(), at(9, 0)),
            Err(CoreError::Forbidden(_))
        );
        input.on_behalf = true;
        assert!(open(&mut rec, input, &EngineConfig::default(), Uuid::now_v7(), at(9, 0)).is_ok());
    }

    #[test]
    fn open_freezes_signals() {
        let mut rec = absent_record();
        open_one(&mut rec);
        assert!(rec.is_frozen());
    }

    // -----------------------------------------------------------------------
    // Review
    // -----------------------------------------------------------------------

    #[test]
    fn review_is_idempotent_for_same_reviewer() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        let first = mark_under_review(&mut rec, d.id, REVIEWER, at(9, 10)).unwrap();
        let again = mark_under_review(&mut rec, d.id, REVIEWER, at(9, 20)).unwrap();
        assert_eq!(first, again);
        assert_eq!(again.reviewed_at, Some(at(9, 10)));
    }

    #[test]
    fn review_by_other_reviewer_conflicts() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        mark_under_review(&mut rec, d.id, REVIEWER, at(9, 10)).unwrap();
        assert_matches!(
            mark_under_review(&mut rec, d.id, 100, at(9, 11)),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn raiser_cannot_review_own_dispute() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        assert_matches!(
            mark_under_review(&mut rec, d.id, TEACHER, at(9, 10)),
            Err(CoreError::Forbidden(_))
        );
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    #[test]
    fn accept_overrides_status_and_keeps_machine_verdict() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        let resolved = resolve(
            &mut rec,
            d.id,
            REVIEWER,
            DisputeOutcome::Accept,
            "Medical certificate verified",
            at(10, 0),
        )
        .unwrap();

        assert_eq!(resolved.status, DisputeStatus::Accepted);
        assert_eq!(resolved.resolved_by, Some(REVIEWER));
        assert_eq!(rec.status(at(10, 0)), AttendanceStatus::Confirmed);
        assert_eq!(rec.machine_status(at(10, 0)), AttendanceStatus::Absent);

        let o = rec.status_override.as_ref().unwrap();
        assert_eq!(o.dispute_id, d.id);
        assert_eq!(o.decided_by, REVIEWER);
        assert_eq!(o.decided_at, at(10, 0));
        assert!(rec.comment.as_deref().unwrap().contains("Medical certificate"));
        assert!(!rec.is_frozen());
        assert!(rec.audit.iter().any(|e| e.event
            == AuditEvent::StatusOverridden {
                from: AttendanceStatus::Absent,
                to: AttendanceStatus::Confirmed,
            }));
    }

    #[test]
    fn reject_leaves_status_standing() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        resolve(&mut rec, d.id, REVIEWER, DisputeOutcome::Reject, "No evidence", at(10, 0)).unwrap();
        assert_eq!(rec.status(at(10, 0)), AttendanceStatus::Absent);
        assert!(rec.status_override.is_none());
        assert_eq!(
            rec.dispute(d.id).unwrap().resolver_comment.as_deref(),
            Some("No evidence")
        );
    }

    #[test]
    fn resolving_twice_reports_already_resolved() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        resolve(&mut rec, d.id, REVIEWER, DisputeOutcome::Reject, "No evidence", at(10, 0)).unwrap();
        assert_matches!(
            resolve(&mut rec, d.id, REVIEWER, DisputeOutcome::Accept, "Changed mind", at(10, 5)),
            Err(CoreError::AlreadyResolved(id)) if id == d.id
        );
        assert_matches!(
            mark_under_review(&mut rec, d.id, REVIEWER, at(10, 6)),
            Err(CoreError::AlreadyResolved(_))
        );
    }

    #[test]
    fn resolve_by_non_assigned_reviewer_conflicts() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        mark_under_review(&mut rec, d.id, REVIEWER, at(9, 10)).unwrap();
        assert_matches!(
            resolve(&mut rec, d.id, 100, DisputeOutcome::Accept, "ok", at(9, 20)),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn resolve_requires_comment() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        assert_matches!(
            resolve(&mut rec, d.id, REVIEWER, DisputeOutcome::Reject, "  ", at(9, 20)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn resolver_comment_limit_counts_characters() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        let too_long = "ü".repeat(MAX_RESOLVER_COMMENT_LENGTH + 1);
        assert_matches!(
            resolve(&mut rec, d.id, REVIEWER, DisputeOutcome::Reject, &too_long, at(9, 20)),
            Err(CoreError::Validation(_))
        );

        let at_limit = "ü".repeat(MAX_RESOLVER_COMMENT_LENGTH);
        let resolved =
            resolve(&mut rec, d.id, REVIEWER, DisputeOutcome::Reject, &at_limit, at(9, 20)).unwrap();
        assert_eq!(resolved.resolver_comment.as_deref(), Some(at_limit.as_str()));
    }

    #[test]
    fn new_dispute_allowed_after_rejection() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        resolve(&mut rec, d.id, REVIEWER, DisputeOutcome::Reject, "No evidence", at(10, 0)).unwrap();
        let second = open(&mut rec, illness(), &EngineConfig::default(), Uuid::now_v7(), at(11, 0));
        assert!(second.is_ok());
        assert_eq!(rec.disputes.len(), 2);
    }

    #[test]
    fn accepted_record_cannot_be_disputed_again() {
        let mut rec = absent_record();
        let d = open_one(&mut rec);
        resolve(&mut rec, d.id, REVIEWER, DisputeOutcome::Accept, "Verified", at(10, 0)).unwrap();
        assert_matches!(
            open(&mut rec, illness(), &EngineConfig::default(), Uuid::now_v7(), at(11, 0)),
            Err(CoreError::InvalidRecord(_))
        );
    }

    #[test]
    fn unknown_dispute_not_found() {
        let mut rec = absent_record();
        assert_matches!(
            mark_under_review(&mut rec, Uuid::now_v7(), REVIEWER, at(9, 0)),
            Err(CoreError::NotFound { entity: "Dispute", .. })
        );
    }
}
