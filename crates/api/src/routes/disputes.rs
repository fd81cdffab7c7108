//! Route definitions for the dispute workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::disputes;
use crate::state::AppState;

/// ```text
/// POST   /                          open_dispute
/// GET    /{dispute_id}              get_dispute
/// POST   /{dispute_id}/review       review_dispute
/// POST   /{dispute_id}/resolve      resolve_dispute
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(disputes::open_dispute))
        .route("/{dispute_id}", get(disputes::get_dispute))
        .route("/{dispute_id}/review", post(disputes::review_dispute))
        .route("/{dispute_id}/resolve", post(disputes::resolve_dispute))
}
