//! Error types for the Tandem pipeline

use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// The main error type for all Tandem operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A capability or caller broke the pipeline contract
    ///
    /// Raised for capability version mismatches and for input the pipeline
    /// cannot represent. Never retried.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The conversation contains content the target wire format cannot express
    ///
    /// Raised during normalization, before any network-bound work starts.
    /// Never retried.
    #[error("unsupported content: {0}")]
    UnsupportedContent(String),

    /// A network- or provider-side failure that is safe to retry
    #[error("transient failure: {message}")]
    Transient {
        /// Error message
        message: String,
        /// Provider-suggested wait before the next attempt, if any
        retry_after: Option<Duration>,
        /// Underlying error if available
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The caller's cancellation signal fired
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a transient error from a message
    pub fn transient(message: impl Into<String>) -> Self {
        Error::Transient {
            message: message.into(),
            retry_after: None,
            source: None,
        }
    }

    /// Create a transient error wrapping an underlying cause
    pub fn transient_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Error::Transient {
            message: message.into(),
            retry_after: None,
            source: Some(Box::new(source)),
        }
    }

    /// Whether the retry executor may attempt this operation again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transient { .. })
    }

    /// The provider-suggested delay before the next attempt, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for Tandem operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        // Serialization only fails here when a caller handed us data that
        // cannot be represented, which is a contract issue, not a transient one.
        Error::ContractViolation(format!("unserializable value: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let error = Error::ContractViolation("version mismatch".into());
        assert_eq!(error.to_string(), "contract violation: version mismatch");

        let error = Error::UnsupportedContent("file part".into());
        assert_eq!(error.to_string(), "unsupported content: file part");

        let error = Error::transient("connection reset");
        assert_eq!(error.to_string(), "transient failure: connection reset");

        let error = Error::Cancelled;
        assert_eq!(error.to_string(), "operation cancelled");
    }

    #[test]
    fn test_error_source() {
        let error = Error::transient("connection reset");
        assert!(error.source().is_none());

        let io_error = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let error = Error::transient_with_source("connection refused", io_error);
        assert!(error.source().is_some());

        let error = Error::ContractViolation("bad version".into());
        assert!(error.source().is_none());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::transient("timeout").is_retryable());
        assert!(!Error::ContractViolation("bad version".into()).is_retryable());
        assert!(!Error::UnsupportedContent("file part".into()).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let error = Error::Transient {
            message: "rate limited".into(),
            retry_after: Some(Duration::from_secs(30)),
            source: None,
        };
        assert_eq!(error.retry_after(), Some(Duration::from_secs(30)));
        assert!(Error::transient("timeout").retry_after().is_none());
        assert!(Error::Cancelled.retry_after().is_none());
    }

    #[test]
    fn test_error_from_serde_json_error() {
        let json_error = serde_json::from_str::<String>("invalid").unwrap_err();
        let error: Error = json_error.into();

        match error {
            Error::ContractViolation(message) => {
                assert!(message.contains("unserializable value"));
            }
            _ => panic!("Expected ContractViolation error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
