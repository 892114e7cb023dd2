//! Error types for the sync client.

use incsync_protocol::ProtocolError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while driving a sync stream.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or transport error. Propagated to the caller as-is;
    /// the stream never retries or swallows it.
    #[error("transport error: {message}")]
    Transport {
        /// Error message from the transport collaborator.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// A response failed wire validation.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A date-time string could not be parsed.
    #[error("unparseable time: {0}")]
    TimeParse(String),

    /// A record in the stream is missing a required field or holds an
    /// uninterpretable value.
    #[error("malformed record: {0}")]
    Record(String),

    /// A sink operation failed.
    #[error("model sink error: {0}")]
    Sink(String),
}

impl ClientError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport { retryable: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ClientError::transport_retryable("connection reset").is_retryable());
        assert!(!ClientError::transport_fatal("bad certificate").is_retryable());
        assert!(!ClientError::TimeParse("whenever".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = ClientError::TimeParse("soonish".into());
        assert!(err.to_string().contains("soonish"));
    }
}
