//! Handlers for the dispute workflow.
//!
//! Opening, claiming and resolving a dispute all run under the disputed
//! record's lock inside the engine; handlers only translate payloads.

use attendance_core::dispute::{Dispute, DisputeOutcome, NewDispute};
use attendance_core::record::RecordView;
use attendance_core::types::{DbId, DisputeId, OccurrenceId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response body for `POST /disputes`.
#[derive(Debug, Serialize)]
pub struct DisputeCreated {
    pub dispute_id: DisputeId,
}

/// Request body for `POST /disputes/{id}/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub reviewer: DbId,
}

/// Request body for `POST /disputes/{id}/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub resolver: DbId,
    pub outcome: DisputeOutcome,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ResolvedDispute {
    pub dispute: Dispute,
    pub record: RecordView,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/disputes
pub async fn open_dispute(
    State(state): State<AppState>,
    Json(input): Json<NewDispute>,
) -> AppResult<impl IntoResponse> {
    let dispute = state.engine.open_dispute(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DisputeCreated {
                dispute_id: dispute.id,
            },
        }),
    ))
}

/// GET /api/v1/disputes/{dispute_id}
pub async fn get_dispute(
    State(state): State<AppState>,
    Path(dispute_id): Path<DisputeId>,
) -> AppResult<impl IntoResponse> {
    let dispute = state.engine.dispute(dispute_id).await?;
    Ok(Json(DataResponse { data: dispute }))
}

/// GET /api/v1/records/{occurrence_id}/disputes
pub async fn list_record_disputes(
    State(state): State<AppState>,
    Path(occurrence_id): Path<OccurrenceId>,
) -> AppResult<impl IntoResponse> {
    let disputes = state.engine.disputes_for_record(occurrence_id).await?;
    Ok(Json(DataResponse { data: disputes }))
}

/// POST /api/v1/disputes/{dispute_id}/review
///
/// Claim an open dispute. Repeating the claim as the same reviewer is a
/// no-op; a different reviewer gets 409.
pub async fn review_dispute(
    State(state): State<AppState>,
    Path(dispute_id): Path<DisputeId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let dispute = state
        .engine
        .mark_under_review(dispute_id, input.reviewer)
        .await?;
    Ok(Json(DataResponse { data: dispute }))
}

/// POST /api/v1/disputes/{dispute_id}/resolve
///
/// Accept or reject a dispute. Returns the resolved dispute together with
/// the record's resulting view.
pub async fn resolve_dispute(
    State(state): State<AppState>,
    Path(dispute_id): Path<DisputeId>,
    Json(input): Json<ResolveRequest>,
) -> AppResult<impl IntoResponse> {
    let (dispute, record) = state
        .engine
        .resolve_dispute(dispute_id, input.resolver, input.outcome, &input.comment)
        .await?;
    Ok(Json(DataResponse {
        data: ResolvedDispute { dispute, record },
    }))
}
