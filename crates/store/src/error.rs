//! Store errors

use thiserror::Error;

/// Errors from storage collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid rule configuration: {0}")]
    InvalidRule(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    /// Create an invalid-rule error.
    pub fn invalid_rule(reason: impl Into<String>) -> Self {
        StoreError::InvalidRule(reason.into())
    }
}
