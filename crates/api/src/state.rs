use std::sync::Arc;

use attendance_core::engine::AttendanceEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The attendance engine. Owns all records and disputes.
    pub engine: Arc<AttendanceEngine>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
