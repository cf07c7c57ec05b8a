use thiserror::Error;

/// Logical outcomes of the entry layer. Transport-agnostic; the HTTP boundary
/// translates these in `crate::errors`.
#[derive(Debug, Error)]
pub enum RoastError {
    #[error("Roast {0} not found")]
    NotFound(String),

    #[error("You do not have permission to {action} this roast")]
    Forbidden { action: &'static str },

    #[error("Timestamp {0} cannot be placed on a calendar")]
    InvalidTimestamp(i64),

    #[error("Storage backend is not configured: {0}")]
    Unconfigured(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Stored roast is corrupt: {0}")]
    Corrupt(String),
}
