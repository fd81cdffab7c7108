//! Route definitions for attendance records.

use axum::routing::get;
use axum::Router;

use crate::handlers::{disputes, records};
use crate::state::AppState;

/// ```text
/// GET    /{occurrence_id}            get_record
/// GET    /{occurrence_id}/disputes   list_record_disputes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{occurrence_id}", get(records::get_record))
        .route(
            "/{occurrence_id}/disputes",
            get(disputes::list_record_disputes),
        )
}
