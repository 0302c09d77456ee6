//! Protocol error types.

use thiserror::Error;

use crate::request::ValidationError;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors from decoding or validating listing traffic.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The body is not valid JSON, or JSON of the wrong type.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Valid JSON that is not a listing.
    #[error("unexpected payload: {0}")]
    UnexpectedShape(String),

    /// Request parameters failed validation.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
}
