use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// ```text
/// GET    /?date_from&date_to&view    get_violation_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(analytics::get_violation_summary))
}
