//! Verdict derivation from the pair of signal states.
//!
//! Both signals confirm eagerly. Partial or missing evidence waits for the
//! window to close before it becomes a terminal verdict.

use serde::{Deserialize, Serialize};

use crate::signal::SignalState;
use crate::time_window::CheckInWindow;
use crate::types::Timestamp;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_MISMATCH: &str = "mismatch";
pub const STATUS_ABSENT: &str = "absent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Window still open and evidence incomplete. Never written as a verdict.
    Pending,
    Confirmed,
    /// Exactly one of the two signals arrived.
    Mismatch,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Confirmed => STATUS_CONFIRMED,
            Self::Mismatch => STATUS_MISMATCH,
            Self::Absent => STATUS_ABSENT,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Mismatch and absent both count against the teacher.
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Mismatch | Self::Absent)
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the status for a record's signals at `now`.
///
/// Pure and idempotent: identical inputs always give the same answer.
pub fn resolve(signals: &SignalState, window: &CheckInWindow, now: Timestamp) -> AttendanceStatus {
    let qr = signals.qr_confirmed();
    let biometric = signals.biometric_confirmed();

    if qr && biometric {
        return AttendanceStatus::Confirmed;
    }
    if !window.has_closed(now) {
        return AttendanceStatus::Pending;
    }
    if qr || biometric {
        AttendanceStatus::Mismatch
    } else {
        AttendanceStatus::Absent
    }
}
