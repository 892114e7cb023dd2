//! Error types for the wire protocol.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding protocol messages.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The request body is not parseable JSON, or not a JSON object.
    #[error("malformed request: {0}")]
    MalformedJson(String),

    /// A field is present but has the wrong type, holds an unrecognized
    /// enum value, or is not a recognized field name.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: String,
        /// Why the field was rejected.
        reason: String,
    },
}

impl ProtocolError {
    /// Creates an `InvalidField` error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::MalformedJson("expected value".into());
        assert!(err.to_string().contains("malformed request"));

        let err = ProtocolError::invalid_field("limit", "must be an integer or null");
        assert!(err.to_string().contains("limit"));
        assert!(err.to_string().contains("integer"));
    }
}
