use attendance_core::types::OccurrenceId;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/records/{occurrence_id}
///
/// Current record view. The verdict is settled on read if the window closed
/// since the last sweep.
pub async fn get_record(
    State(state): State<AppState>,
    Path(occurrence_id): Path<OccurrenceId>,
) -> AppResult<impl IntoResponse> {
    let record = state.engine.record(occurrence_id).await?;
    Ok(Json(DataResponse { data: record }))
}
