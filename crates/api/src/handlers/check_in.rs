//! Handlers for QR and biometric check-in submission.
//!
//! A rejected check-in is a normal outcome, not an HTTP error: the response
//! is always 200 with `accepted: false` and a machine-readable `reason`, plus
//! the countdown fields the client needs to explain it.

use attendance_core::signal::{CheckInOutcome, Evidence, RejectReason, SignalKind};
use attendance_core::types::{OccurrenceId, Timestamp};
use attendance_core::verdict::AttendanceStatus;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /check-ins`.
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub occurrence_id: OccurrenceId,
    pub signal_kind: SignalKind,
    pub evidence: Evidence,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resulting_status: Option<AttendanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<Timestamp>,
    /// Seconds until the window opens (too early).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opens_in_secs: Option<i64>,
    /// Seconds since the window closed (too late).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_secs_ago: Option<i64>,
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(outcome: CheckInOutcome) -> Self {
        let mut response = Self {
            accepted: outcome.is_accepted(),
            reason: None,
            resulting_status: None,
            confirmed_at: None,
            opens_in_secs: None,
            closed_secs_ago: None,
        };
        match outcome {
            CheckInOutcome::Accepted {
                confirmed_at,
                resulting_status,
            } => {
                response.resulting_status = Some(resulting_status);
                response.confirmed_at = Some(confirmed_at);
            }
            CheckInOutcome::Rejected(reason) => {
                response.reason = Some(reason.code());
                match reason {
                    RejectReason::WindowNotOpen { opens_in_secs } => {
                        response.opens_in_secs = Some(opens_in_secs);
                    }
                    RejectReason::WindowClosed { closed_secs_ago } => {
                        response.closed_secs_ago = Some(closed_secs_ago);
                    }
                    RejectReason::AlreadyConfirmed { confirmed_at } => {
                        response.confirmed_at = Some(confirmed_at);
                    }
                    RejectReason::UnknownOccurrence | RejectReason::RecordFrozen => {}
                }
            }
        }
        response
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/check-ins
pub async fn submit_check_in(
    State(state): State<AppState>,
    Json(input): Json<CheckInRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .submit(input.occurrence_id, input.signal_kind, input.evidence)
        .await?;

    Ok(Json(DataResponse {
        data: CheckInResponse::from(outcome),
    }))
}
