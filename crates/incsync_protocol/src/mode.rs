//! Sync modes.

use crate::error::{ProtocolError, ProtocolResult};

/// Selects which timestamp column drives cursoring and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Sync records by creation time.
    New,
    /// Sync records by modification time.
    Modified,
}

impl SyncMode {
    /// Returns the wire string for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::New => "new",
            SyncMode::Modified => "modified",
        }
    }

    /// Parses a wire string into a mode.
    pub fn from_str(s: &str) -> ProtocolResult<Self> {
        match s {
            "new" => Ok(SyncMode::New),
            "modified" => Ok(SyncMode::Modified),
            other => Err(ProtocolError::invalid_field(
                "type",
                format!("unknown sync type `{other}`, expected `new` or `modified`"),
            )),
        }
    }
}
