//! Client error types.

use std::fmt;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Invalid listing request.
    Request(String),
    /// Event source error.
    Source(String),
    /// IO error.
    Io(std::io::Error),
    /// Output could not be rendered.
    Output(String),
    /// Logging could not be initialized.
    Logging(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Request(msg) => write!(f, "invalid request: {}", msg),
            Self::Source(msg) => write!(f, "source error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
            Self::Logging(msg) => write!(f, "logging error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<eventfold_sources::SourceError> for ClientError {
    fn from(err: eventfold_sources::SourceError) -> Self {
        Self::Source(err.to_string())
    }
}

impl From<eventfold_aggregator::AggregateError> for ClientError {
    fn from(err: eventfold_aggregator::AggregateError) -> Self {
        use eventfold_aggregator::AggregateError;
        match err {
            AggregateError::Validation(e) => Self::Request(e.to_string()),
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<eventfold_protocol::ValidationError> for ClientError {
    fn from(err: eventfold_protocol::ValidationError) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<eventfold_protocol::ProtocolError> for ClientError {
    fn from(err: eventfold_protocol::ProtocolError) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<eventfold_core::TracingError> for ClientError {
    fn from(err: eventfold_core::TracingError) -> Self {
        Self::Logging(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_request() {
        let err: ClientError = eventfold_aggregator::AggregateError::Validation(
            eventfold_protocol::ValidationError::InvalidOrder("UP".to_string()),
        )
        .into();
        assert!(matches!(err, ClientError::Request(_)));
        assert!(err.to_string().starts_with("invalid request:"));
    }

    #[test]
    fn duplicate_source_maps_to_config() {
        let err: ClientError =
            eventfold_aggregator::AggregateError::duplicate_source("north").into();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
