//! The attendance record aggregate.
//!
//! A record owns its signal evidence, the machine verdict once it is
//! terminal, any human override from an accepted dispute, the dispute
//! history, and an append-only audit trail. Status is always derived;
//! nothing outside [`crate::dispute`] can change it.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::dispute::{Dispute, DisputeOutcome};
use crate::error::CoreError;
use crate::schedule::LessonOccurrence;
use crate::signal::{SignalKind, SignalState};
use crate::time_window::{window_for, CheckInWindow, WindowStatus};
use crate::types::{DbId, DisputeId, OccurrenceId, Timestamp};
use crate::verdict::{self, AttendanceStatus};

/// Provenance of a status set by an accepted dispute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusOverride {
    pub status: AttendanceStatus,
    pub dispute_id: DisputeId,
    pub decided_by: DbId,
    pub decided_at: Timestamp,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    Registered,
    SignalAccepted {
        signal: SignalKind,
    },
    VerdictSettled {
        status: AttendanceStatus,
    },
    DisputeOpened {
        dispute_id: DisputeId,
    },
    DisputeUnderReview {
        dispute_id: DisputeId,
    },
    DisputeResolved {
        dispute_id: DisputeId,
        outcome: DisputeOutcome,
    },
    StatusOverridden {
        from: AttendanceStatus,
        to: AttendanceStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub at: Timestamp,
    pub actor: Option<DbId>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    pub occurrence: LessonOccurrence,
    pub window: CheckInWindow,
    pub signals: SignalState,
    /// Machine verdict. Written once, when it first becomes terminal.
    pub verdict: Option<AttendanceStatus>,
    pub status_override: Option<StatusOverride>,
    pub comment: Option<String>,
    /// Every dispute ever raised against this record, oldest first.
    pub disputes: Vec<Dispute>,
    pub audit: Vec<AuditEntry>,
}

impl AttendanceRecord {
    pub fn new(
        occurrence: LessonOccurrence,
        config: &EngineConfig,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        let window = window_for(&occurrence, config)?;
        let mut record = Self {
            occurrence,
            window,
            signals: SignalState::default(),
            verdict: None,
            status_override: None,
            comment: None,
            disputes: Vec::new(),
            audit: Vec::new(),
        };
        record.push_audit(now, None, AuditEvent::Registered);
        Ok(record)
    }

    pub fn id(&self) -> OccurrenceId {
        self.occurrence.id
    }

    pub fn push_audit(&mut self, at: Timestamp, actor: Option<DbId>, event: AuditEvent) {
        self.audit.push(AuditEntry { at, actor, event });
    }

    /// The machine's view: the stored verdict, or a fresh derivation.
    pub fn machine_status(&self, now: Timestamp) -> AttendanceStatus {
        self.verdict
            .unwrap_or_else(|| verdict::resolve(&self.signals, &self.window, now))
    }

    /// The adjudicated view: an accepted dispute's override wins.
    pub fn status(&self, now: Timestamp) -> AttendanceStatus {
        match &self.status_override {
            Some(o) => o.status,
            None => self.machine_status(now),
        }
    }

    /// Persist the verdict if it has just become terminal.
    ///
    /// Returns the newly written verdict, or `None` when there was nothing to
    /// write (still pending, or already settled).
    pub fn settle(&mut self, now: Timestamp) -> Option<AttendanceStatus> {
        if self.verdict.is_some() {
            return None;
        }
        let status = verdict::resolve(&self.signals, &self.window, now);
        if !status.is_terminal() {
            return None;
        }
        self.verdict = Some(status);
        self.push_audit(now, None, AuditEvent::VerdictSettled { status });
        tracing::info!(
            occurrence_id = self.id(),
            teacher_id = self.occurrence.teacher_id,
            status = %status,
            "Attendance verdict settled"
        );
        Some(status)
    }

    /// The dispute that is neither accepted nor rejected, if any.
    pub fn active_dispute(&self) -> Option<&Dispute> {
        self.disputes.iter().find(|d| !d.status.is_resolved())
    }

    /// Signals are frozen while a dispute is in progress.
    pub fn is_frozen(&self) -> bool {
        self.active_dispute().is_some()
    }

    pub fn dispute(&self, id: DisputeId) -> Option<&Dispute> {
        self.disputes.iter().find(|d| d.id == id)
    }

    pub fn dispute_mut(&mut self, id: DisputeId) -> Option<&mut Dispute> {
        self.disputes.iter_mut().find(|d| d.id == id)
    }

    /// Snapshot for callers outside the lock.
    pub fn view(&self, now: Timestamp) -> RecordView {
        RecordView {
            occurrence: self.occurrence.clone(),
            window: self.window,
            window_status: self.window.status(now),
            qr_confirmed: self.signals.qr_confirmed(),
            qr_confirmed_at: self.signals.qr.as_ref().map(|s| s.confirmed_at),
            biometric_confirmed: self.signals.biometric_confirmed(),
            biometric_confirmed_at: self.signals.biometric.as_ref().map(|s| s.confirmed_at),
            machine_status: self.machine_status(now),
            status: self.status(now),
            status_override: self.status_override.clone(),
            comment: self.comment.clone(),
            dispute_ref: self.disputes.last().map(|d| d.id),
            audit: self.audit.clone(),
        }
    }
}

/// Read-only record as returned to callers and fed to analytics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub occurrence: LessonOccurrence,
    pub window: CheckInWindow,
    pub window_status: WindowStatus,
    pub qr_confirmed: bool,
    pub qr_confirmed_at: Option<Timestamp>,
    pub biometric_confirmed: bool,
    pub biometric_confirmed_at: Option<Timestamp>,
    /// Verdict from sensor evidence alone.
    pub machine_status: AttendanceStatus,
    /// Verdict after any accepted dispute.
    pub status: AttendanceStatus,
    pub status_override: Option<StatusOverride>,
    pub comment: Option<String>,
    pub dispute_ref: Option<DisputeId>,
    pub audit: Vec<AuditEntry>,
}
