//! Check-in signal registration.
//!
//! Each occurrence has two independent evidence slots, one per
//! [`SignalKind`]. A slot is written at most once: later submissions for the
//! same kind are rejected so the first evidence timestamp is never replaced.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, WindowError};
use crate::record::{AttendanceRecord, AuditEvent};
use crate::types::{OccurrenceId, Timestamp};
use crate::verdict::AttendanceStatus;

/// Maximum length of an evidence source identifier.
pub const MAX_SOURCE_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Qr,
    Biometric,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Biometric => "biometric",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the scanner or camera reported alongside the signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Identifier of the device that produced the signal.
    pub source: String,
    /// Opaque device payload, stored verbatim.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl Evidence {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            payload: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.source.trim().is_empty() {
            return Err(CoreError::Validation(
                "Evidence source must not be empty".to_string(),
            ));
        }
        if self.source.chars().count() > MAX_SOURCE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Evidence source exceeds maximum length of {MAX_SOURCE_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmedSignal {
    pub confirmed_at: Timestamp,
    pub evidence: Evidence,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalState {
    pub qr: Option<ConfirmedSignal>,
    pub biometric: Option<ConfirmedSignal>,
}

impl SignalState {
    pub fn get(&self, kind: SignalKind) -> Option<&ConfirmedSignal> {
        match kind {
            SignalKind::Qr => self.qr.as_ref(),
            SignalKind::Biometric => self.biometric.as_ref(),
        }
    }

    pub fn qr_confirmed(&self) -> bool {
        self.qr.is_some()
    }

    pub fn biometric_confirmed(&self) -> bool {
        self.biometric.is_some()
    }

    /// Compare-and-set on the slot for `kind`.
    ///
    /// Returns the timestamp already held by the slot when it was set before.
    pub fn try_confirm(
        &mut self,
        kind: SignalKind,
        evidence: Evidence,
        at: Timestamp,
    ) -> Result<(), Timestamp> {
        let slot = match kind {
            SignalKind::Qr => &mut self.qr,
            SignalKind::Biometric => &mut self.biometric,
        };
        if let Some(existing) = slot {
            return Err(existing.confirmed_at);
        }
        *slot = Some(ConfirmedSignal {
            confirmed_at: at,
            evidence,
        });
        Ok(())
    }
}

/// Why a check-in was not counted. These are outcomes, not failures: the
/// caller shows them to the user and does not retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    WindowNotOpen { opens_in_secs: i64 },
    WindowClosed { closed_secs_ago: i64 },
    AlreadyConfirmed { confirmed_at: Timestamp },
    UnknownOccurrence,
    /// A dispute is in progress for the record.
    RecordFrozen,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::WindowNotOpen { .. } => "window_not_open",
            Self::WindowClosed { .. } => "window_closed",
            Self::AlreadyConfirmed { .. } => "already_confirmed",
            Self::UnknownOccurrence => "unknown_occurrence",
            Self::RecordFrozen => "record_frozen",
        }
    }

    /// Map onto the error taxonomy for callers that want a [`CoreError`].
    pub fn to_error(&self, occurrence_id: OccurrenceId) -> CoreError {
        match *self {
            Self::WindowNotOpen { opens_in_secs } => {
                CoreError::Window(WindowError::TooEarly { opens_in_secs })
            }
            Self::WindowClosed { closed_secs_ago } => {
                CoreError::Window(WindowError::TooClosed { closed_secs_ago })
            }
            Self::AlreadyConfirmed { confirmed_at } => CoreError::Conflict(format!(
                "Signal already confirmed for occurrence {occurrence_id} at {confirmed_at}"
            )),
            Self::UnknownOccurrence => CoreError::not_found("LessonOccurrence", occurrence_id),
            Self::RecordFrozen => CoreError::InvalidState(format!(
                "Record {occurrence_id} is under dispute and accepts no further signals"
            )),
        }
    }
}

impl From<WindowError> for RejectReason {
    fn from(err: WindowError) -> Self {
        match err {
            WindowError::TooEarly { opens_in_secs } => Self::WindowNotOpen { opens_in_secs },
            WindowError::TooClosed { closed_secs_ago } => Self::WindowClosed { closed_secs_ago },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckInOutcome {
    Accepted {
        confirmed_at: Timestamp,
        resulting_status: AttendanceStatus,
    },
    Rejected(RejectReason),
}

impl CheckInOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Apply one check-in attempt to a record.
///
/// Must run under the record's lock. On acceptance the verdict is
/// re-evaluated immediately, so a second signal confirms the record before
/// the window closes.
pub fn register(
    record: &mut AttendanceRecord,
    kind: SignalKind,
    evidence: Evidence,
    now: Timestamp,
) -> CheckInOutcome {
    if record.is_frozen() {
        return CheckInOutcome::Rejected(RejectReason::RecordFrozen);
    }

    // Duplicates are reported as such even after the window closed, so a
    // retried scan tells the user they are already checked in.
    if let Some(existing) = record.signals.get(kind) {
        return CheckInOutcome::Rejected(RejectReason::AlreadyConfirmed {
            confirmed_at: existing.confirmed_at,
        });
    }

    if let Err(err) = record.window.check(now) {
        return CheckInOutcome::Rejected(err.into());
    }

    if let Err(confirmed_at) = record.signals.try_confirm(kind, evidence, now) {
        return CheckInOutcome::Rejected(RejectReason::AlreadyConfirmed { confirmed_at });
    }
    record.push_audit(now, None, AuditEvent::SignalAccepted { signal: kind });
    record.settle(now);

    CheckInOutcome::Accepted {
        confirmed_at: now,
        resulting_status: record.status(now),
    }
}
