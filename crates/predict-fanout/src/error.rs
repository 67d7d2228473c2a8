//! Error types for the dispatcher and its prediction services.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for dispatcher operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Failure of a single prediction request.
///
/// These never escape a run: the dispatcher records them against the error
/// rate and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The request did not complete within its per-request timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, I/O or protocol failure below the prediction contract
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("remote error (status {status}): {message}")]
    Remote { status: u16, message: String },

    /// The response could not be turned into a score vector
    #[error("decode error: {0}")]
    Decode(String),

    /// The `host:port` address could not be parsed
    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    /// The service implementation panicked while handling the request
    #[error("service panicked: {0}")]
    Panicked(String),
}

/// Errors surfaced to the caller of a run.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Rejected before any request was issued
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The overall deadline elapsed before every request completed
    #[error("deadline exceeded: {completed} of {total} requests completed")]
    DeadlineExceeded { completed: usize, total: usize },

    /// The prediction service could not be constructed
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl DispatchError {
    /// Whether the error stems from bad input rather than a failed run.
    pub fn is_usage(&self) -> bool {
        matches!(self, DispatchError::InvalidConfig(_) | DispatchError::Service(ServiceError::InvalidAddress(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ServiceError::Remote { status: 404, message: "Servable not found".into() };
        assert_eq!(err.to_string(), "remote error (status 404): Servable not found");

        let err = DispatchError::DeadlineExceeded { completed: 3, total: 10 };
        assert_eq!(err.to_string(), "deadline exceeded: 3 of 10 requests completed");
    }

    #[test]
    fn test_usage_classification() {
        assert!(DispatchError::InvalidConfig("x".into()).is_usage());
        assert!(DispatchError::from(ServiceError::InvalidAddress("nope".into())).is_usage());
        assert!(!DispatchError::DeadlineExceeded { completed: 0, total: 1 }.is_usage());
        assert!(!DispatchError::from(ServiceError::Transport("reset".into())).is_usage());
    }
}
