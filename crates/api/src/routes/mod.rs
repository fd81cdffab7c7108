pub mod analytics;
pub mod check_in;
pub mod disputes;
pub mod health;
pub mod occurrences;
pub mod records;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /occurrences                                     register a scheduled lesson (POST)
///
/// /check-ins                                       submit a QR or biometric signal (POST)
///
/// /records/{occurrence_id}                         current record view (GET)
/// /records/{occurrence_id}/disputes                dispute history (GET)
///
/// /disputes                                        open a dispute (POST)
/// /disputes/{id}                                   get dispute (GET)
/// /disputes/{id}/review                            claim for review (POST)
/// /disputes/{id}/resolve                           accept or reject (POST)
///
/// /analytics                                       violation summary (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/occurrences", occurrences::router())
        .nest("/check-ins", check_in::router())
        .nest("/records", records::router())
        .nest("/disputes", disputes::router())
        .nest("/analytics", analytics::router())
}
