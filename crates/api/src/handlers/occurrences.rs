//! Handlers for schedule ingestion.

use attendance_core::schedule::LessonOccurrence;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/occurrences
///
/// Register a scheduled lesson and create its pending attendance record.
/// Re-posting an identical occurrence returns the existing record.
pub async fn register_occurrence(
    State(state): State<AppState>,
    Json(input): Json<LessonOccurrence>,
) -> AppResult<impl IntoResponse> {
    let record = state.engine.register_occurrence(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}
