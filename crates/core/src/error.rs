use crate::types::DisputeId;

/// Why a check-in fell outside its legal time range.
///
/// Split so callers can render a countdown for [`WindowError::TooEarly`] and a
/// hard failure for [`WindowError::TooClosed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("Check-in window opens in {opens_in_secs} seconds")]
    TooEarly { opens_in_secs: i64 },

    #[error("Check-in window closed {closed_secs_ago} seconds ago")]
    TooClosed { closed_secs_ago: i64 },
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Dispute {0} is already resolved")]
    AlreadyResolved(DisputeId),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
