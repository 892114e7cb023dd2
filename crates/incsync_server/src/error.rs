//! Error types for the sync server.

use incsync_protocol::ProtocolError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving a sync request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The inbound request failed wire validation.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A caller-supplied argument violated a precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ServerError {
    /// Returns true if this error is the caller's fault (4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServerError::Protocol(_))
    }
}
