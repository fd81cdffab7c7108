use attendance_core::error::{CoreError, WindowError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error returned by every handler. Renders as `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Malformed request that never reached the engine.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Logged in full, reported to the client without detail.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl AppError {
    /// HTTP status, stable error code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::InvalidState(msg) => (StatusCode::CONFLICT, "INVALID_STATE", msg.clone()),
        CoreError::InvalidRecord(msg) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_RECORD", msg.clone())
        }
        // Early and late stay distinguishable: one is a countdown, the other final.
        CoreError::Window(window @ WindowError::TooEarly { .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "WINDOW_TOO_EARLY",
            window.to_string(),
        ),
        CoreError::Window(window @ WindowError::TooClosed { .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "WINDOW_CLOSED",
            window.to_string(),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::AlreadyResolved(_) => (StatusCode::CONFLICT, "ALREADY_RESOLVED", err.to_string()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Config(msg) => {
            tracing::error!(error = %msg, "Configuration error at request time");
            internal()
        }
    }
}
