//! The attendance integrity engine.
//!
//! Each [`AttendanceRecord`] sits behind its own mutex; every mutation of a
//! record (signals, verdict, disputes) happens while holding it. Cross-record
//! reads take each lock briefly and work on snapshots.
//!
//! Lock order: records index, then a record, then the dispute index. Only
//! eviction holds the records index while locking a record.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::analytics::{self, VerdictView, ViolationSummary};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::dispute::{self, Dispute, DisputeOutcome, NewDispute};
use crate::error::CoreError;
use crate::record::{AttendanceRecord, RecordView};
use crate::schedule::LessonOccurrence;
use crate::signal::{self, CheckInOutcome, Evidence, RejectReason, SignalKind};
use crate::types::{DbId, DisputeId, OccurrenceId};

type RecordSlot = Arc<Mutex<AttendanceRecord>>;

pub struct AttendanceEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    records: RwLock<HashMap<OccurrenceId, RecordSlot>>,
    /// Dispute id -> owning record.
    disputes: RwLock<HashMap<DisputeId, OccurrenceId>>,
}

impl AttendanceEngine {
    /// Build an engine. Fails if `config` would produce an invalid window.
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            records: RwLock::new(HashMap::new()),
            disputes: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn slot(&self, occurrence_id: OccurrenceId) -> Option<RecordSlot> {
        self.records.read().await.get(&occurrence_id).cloned()
    }

    async fn slot_or_not_found(&self, occurrence_id: OccurrenceId) -> Result<RecordSlot, CoreError> {
        self.slot(occurrence_id)
            .await
            .ok_or_else(|| CoreError::not_found("AttendanceRecord", occurrence_id))
    }

    async fn dispute_slot(&self, dispute_id: DisputeId) -> Result<RecordSlot, CoreError> {
        let record_id = self
            .disputes
            .read()
            .await
            .get(&dispute_id)
            .copied()
            .ok_or_else(|| CoreError::not_found("Dispute", dispute_id))?;
        self.slot_or_not_found(record_id).await
    }

    /* ----------------------------------------------------------------------
    Schedule ingestion
    ---------------------------------------------------------------------- */

    /// Register a scheduled occurrence and create its pending record.
    ///
    /// Re-registering the identical occurrence is a no-op; reusing the id
    /// for a different lesson is a conflict.
    pub async fn register_occurrence(
        &self,
        occurrence: LessonOccurrence,
    ) -> Result<RecordView, CoreError> {
        occurrence.validate()?;
        let now = self.clock.now();

        let slot = {
            let mut records = self.records.write().await;
            match records.get(&occurrence.id) {
                Some(existing) => Arc::clone(existing),
                None => {
                    let id = occurrence.id;
                    let teacher_id = occurrence.teacher_id;
                    let date = occurrence.date;
                    let record = AttendanceRecord::new(occurrence, &self.config, now)?;
                    tracing::info!(
                        occurrence_id = id,
                        teacher_id,
                        date = %date,
                        "Occurrence registered"
                    );
                    let view = record.view(now);
                    records.insert(id, Arc::new(Mutex::new(record)));
                    return Ok(view);
                }
            }
        };

        let record = slot.lock().await;
        if record.occurrence != occurrence {
            return Err(CoreError::Conflict(format!(
                "Occurrence {} is already registered with different details",
                occurrence.id
            )));
        }
        Ok(record.view(now))
    }

    /* ----------------------------------------------------------------------
    Check-in
    ---------------------------------------------------------------------- */

    /// Submit one check-in signal.
    ///
    /// Rejections are returned as [`CheckInOutcome::Rejected`]; only
    /// malformed evidence is an error.
    pub async fn submit(
        &self,
        occurrence_id: OccurrenceId,
        kind: SignalKind,
        evidence: Evidence,
    ) -> Result<CheckInOutcome, CoreError> {
        evidence.validate()?;

        let Some(slot) = self.slot(occurrence_id).await else {
            tracing::debug!(occurrence_id, signal = %kind, "Check-in for unknown occurrence");
            return Ok(CheckInOutcome::Rejected(RejectReason::UnknownOccurrence));
        };

        let mut record = slot.lock().await;
        // Read the clock under the lock so accepted signals are ordered by time.
        let now = self.clock.now();
        let outcome = signal::register(&mut record, kind, evidence, now);

        match &outcome {
            CheckInOutcome::Accepted {
                resulting_status, ..
            } => tracing::info!(
                occurrence_id,
                signal = %kind,
                status = %resulting_status,
                "Check-in accepted"
            ),
            CheckInOutcome::Rejected(reason) => tracing::debug!(
                occurrence_id,
                signal = %kind,
                reason = reason.code(),
                "Check-in rejected"
            ),
        }
        Ok(outcome)
    }

    /* ----------------------------------------------------------------------
    Records
    ---------------------------------------------------------------------- */

    /// Current view of a record, settling its verdict if the window closed.
    pub async fn record(&self, occurrence_id: OccurrenceId) -> Result<RecordView, CoreError> {
        let slot = self.slot_or_not_found(occurrence_id).await?;
        let mut record = slot.lock().await;
        let now = self.clock.now();
        record.settle(now);
        Ok(record.view(now))
    }

    /// Settle every record whose window has closed. Returns how many verdicts
    /// were written.
    pub async fn settle_due(&self) -> usize {
        let slots: Vec<RecordSlot> = self.records.read().await.values().cloned().collect();
        let mut settled = 0;
        for slot in slots {
            let mut record = slot.lock().await;
            if record.settle(self.clock.now()).is_some() {
                settled += 1;
            }
        }
        settled
    }

    /// Drop records dated before `before` that can no longer change: the
    /// verdict is stored and no dispute is pending. Their disputes leave the
    /// dispute index with them. Returns how many records were dropped.
    pub async fn evict_before(&self, before: NaiveDate) -> usize {
        let now = self.clock.now();
        let mut records = self.records.write().await;

        let mut evicted: Vec<(OccurrenceId, Vec<DisputeId>)> = Vec::new();
        for (id, slot) in records.iter() {
            let mut record = slot.lock().await;
            if record.occurrence.date >= before {
                continue;
            }
            record.settle(now);
            if record.verdict.is_some() && !record.is_frozen() {
                evicted.push((*id, record.disputes.iter().map(|d| d.id).collect()));
            }
        }
        if evicted.is_empty() {
            return 0;
        }

        let mut disputes = self.disputes.write().await;
        for (id, dispute_ids) in &evicted {
            records.remove(id);
            for dispute_id in dispute_ids {
                disputes.remove(dispute_id);
            }
        }

        tracing::info!(evicted = evicted.len(), before = %before, "Evicted settled records");
        evicted.len()
    }

    /// Evict everything older than `retention_days` before today's local date.
    pub async fn evict_expired(&self, retention_days: u64) -> usize {
        let today = self
            .clock
            .now()
            .with_timezone(&self.config.utc_offset)
            .date_naive();
        match today.checked_sub_days(Days::new(retention_days)) {
            Some(cutoff) => self.evict_before(cutoff).await,
            None => 0,
        }
    }

    /// Views of every record whose occurrence date falls in `[from, to]`,
    /// ordered by occurrence id.
    pub async fn snapshot(&self, from: NaiveDate, to: NaiveDate) -> Vec<RecordView> {
        let slots: Vec<RecordSlot> = self.records.read().await.values().cloned().collect();
        let mut views = Vec::new();
        for slot in slots {
            let mut record = slot.lock().await;
            let date = record.occurrence.date;
            if date < from || date > to {
                continue;
            }
            let now = self.clock.now();
            record.settle(now);
            views.push(record.view(now));
        }
        views.sort_by_key(|v| v.occurrence.id);
        views
    }

    /* ----------------------------------------------------------------------
    Disputes
    ---------------------------------------------------------------------- */

    pub async fn open_dispute(&self, input: NewDispute) -> Result<Dispute, CoreError> {
        let record_id = input.record_id;
        let slot = self.slot_or_not_found(record_id).await?;

        let mut record = slot.lock().await;
        let now = self.clock.now();
        let dispute = dispute::open(&mut record, input, &self.config, Uuid::now_v7(), now)?;
        self.disputes.write().await.insert(dispute.id, record_id);

        tracing::info!(
            dispute_id = %dispute.id,
            record_id,
            raised_by = dispute.raised_by,
            reason = ?dispute.reason,
            "Dispute opened"
        );
        Ok(dispute)
    }

    pub async fn mark_under_review(
        &self,
        dispute_id: DisputeId,
        reviewer: DbId,
    ) -> Result<Dispute, CoreError> {
        let slot = self.dispute_slot(dispute_id).await?;
        let mut record = slot.lock().await;
        let now = self.clock.now();
        let dispute = dispute::mark_under_review(&mut record, dispute_id, reviewer, now)
            .inspect_err(|e| {
                tracing::warn!(dispute_id = %dispute_id, reviewer, error = %e, "Review claim refused");
            })?;

        tracing::info!(dispute_id = %dispute_id, reviewer, "Dispute under review");
        Ok(dispute)
    }

    /// Resolve a dispute. Concurrent callers are serialized on the record
    /// lock; all but the first receive [`CoreError::AlreadyResolved`].
    pub async fn resolve_dispute(
        &self,
        dispute_id: DisputeId,
        resolver: DbId,
        outcome: DisputeOutcome,
        comment: &str,
    ) -> Result<(Dispute, RecordView), CoreError> {
        let slot = self.dispute_slot(dispute_id).await?;
        let mut record = slot.lock().await;
        let now = self.clock.now();
        let dispute = dispute::resolve(&mut record, dispute_id, resolver, outcome, comment, now)
            .inspect_err(|e| {
                tracing::warn!(dispute_id = %dispute_id, resolver, error = %e, "Dispute resolution refused");
            })?;

        tracing::info!(
            dispute_id = %dispute_id,
            record_id = dispute.record_id,
            resolver,
            outcome = ?outcome,
            "Dispute resolved"
        );
        Ok((dispute, record.view(now)))
    }

    pub async fn dispute(&self, dispute_id: DisputeId) -> Result<Dispute, CoreError> {
        let slot = self.dispute_slot(dispute_id).await?;
        let record = slot.lock().await;
        record
            .dispute(dispute_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Dispute", dispute_id))
    }

    /// All disputes raised against a record, oldest first.
    pub async fn disputes_for_record(
        &self,
        record_id: OccurrenceId,
    ) -> Result<Vec<Dispute>, CoreError> {
        let slot = self.slot_or_not_found(record_id).await?;
        let record = slot.lock().await;
        Ok(record.disputes.clone())
    }

    /* ----------------------------------------------------------------------
    Analytics
    ---------------------------------------------------------------------- */

    pub async fn analytics(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        view: VerdictView,
    ) -> Result<ViolationSummary, CoreError> {
        if date_from > date_to {
            return Err(CoreError::Validation(format!(
                "date_from ({date_from}) must not be after date_to ({date_to})"
            )));
        }
        let records = self.snapshot(date_from, date_to).await;
        Ok(analytics::summarize(
            &records,
            view,
            self.config.top_violators_limit,
        ))
    }
}
