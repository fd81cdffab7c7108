//! Route definitions for check-in submission.

use axum::routing::post;
use axum::Router;

use crate::handlers::check_in;
use crate::state::AppState;

/// ```text
/// POST   /                          submit_check_in
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(check_in::submit_check_in))
}
