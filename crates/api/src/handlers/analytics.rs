use attendance_core::analytics::VerdictView;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /analytics`.
#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Required. Kept optional here so a missing value produces the
    /// standard JSON error body instead of a query rejection.
    pub view: Option<VerdictView>,
}

/// GET /api/v1/analytics?date_from=YYYY-MM-DD&date_to=YYYY-MM-DD&view=raw|adjudicated
pub async fn get_violation_summary(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<impl IntoResponse> {
    let view = params.view.ok_or_else(|| {
        AppError::BadRequest("Query parameter 'view' is required (raw or adjudicated)".into())
    })?;

    let summary = state
        .engine
        .analytics(params.date_from, params.date_to, view)
        .await?;
    Ok(Json(DataResponse { data: summary }))
}
