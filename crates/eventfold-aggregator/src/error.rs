//! Aggregator error types.

use eventfold_protocol::ValidationError;
use thiserror::Error;

/// Result type for aggregator operations.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Request-level failures.
///
/// Source failures never surface here; they are reported per source in
/// [`crate::ListOutcome::statuses`].
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The listing request was rejected before any fetch.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Two sources share an id, or a remote uses the local id.
    #[error("Duplicate source id: {id}")]
    DuplicateSource { id: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl AggregateError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a duplicate source error.
    pub fn duplicate_source(id: impl Into<String>) -> Self {
        Self::DuplicateSource { id: id.into() }
    }
}
