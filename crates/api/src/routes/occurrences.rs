//! Route definitions for schedule ingestion.

use axum::routing::post;
use axum::Router;

use crate::handlers::occurrences;
use crate::state::AppState;

/// ```text
/// POST   /                          register_occurrence
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(occurrences::register_occurrence))
}
