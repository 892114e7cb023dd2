//! Page request message.

use crate::error::{ProtocolError, ProtocolResult};
use crate::mode::SyncMode;
use serde_json::{json, Map, Value};

/// The recognized request fields besides `type`.
const INT_FIELDS: [&str; 4] = ["limit", "before", "since", "startId"];

/// A single page request as it travels over the wire.
///
/// `since` and `start_id` together form the cursor for this page:
/// everything strictly after `since`, plus rows at `since` whose id is
/// at or beyond `start_id`. A cursor of `(0, 0)` (or absent) means
/// "from the beginning".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Whether the sync tracks creation or modification time.
    pub mode: SyncMode,
    /// Maximum number of records the client wants per page.
    pub limit: Option<u64>,
    /// Upper watermark: only records strictly before this unix time.
    pub before: Option<i64>,
    /// Cursor timestamp (unix seconds).
    pub since: Option<i64>,
    /// Cursor record id.
    pub start_id: Option<u64>,
}

impl PageRequest {
    /// Creates a request with only the mode set.
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            limit: None,
            before: None,
            since: None,
            start_id: None,
        }
    }

    /// Decodes a request from its JSON wire form.
    ///
    /// Every numeric field must be either absent, null, or a
    /// non-negative integer; `type` must be present and recognized;
    /// unrecognized keys are rejected outright.
    pub fn from_json(body: &str) -> ProtocolResult<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
        let map = value
            .as_object()
            .ok_or_else(|| ProtocolError::MalformedJson("expected a JSON object".into()))?;

        for key in map.keys() {
            if key != "type" && !INT_FIELDS.contains(&key.as_str()) {
                return Err(ProtocolError::invalid_field(key, "unrecognized field"));
            }
        }

        let mode = match map.get("type") {
            Some(Value::String(s)) => SyncMode::from_str(s)?,
            Some(_) => {
                return Err(ProtocolError::invalid_field("type", "must be a string"));
            }
            None => return Err(ProtocolError::invalid_field("type", "missing")),
        };

        let limit = read_uint(map, "limit")?;
        let before = read_uint(map, "before")?.map(|v| v as i64);
        let since = read_uint(map, "since")?.map(|v| v as i64);
        let start_id = read_uint(map, "startId")?;

        Ok(Self {
            mode,
            limit,
            before,
            since,
            start_id,
        })
    }

    /// Encodes this request to its JSON wire form.
    ///
    /// The cursor fields default to 0 when unset, `limit` and `before`
    /// to null.
    pub fn to_json(&self) -> String {
        json!({
            "type": self.mode.as_str(),
            "limit": self.limit,
            "before": self.before,
            "since": self.since.unwrap_or(0),
            "startId": self.start_id.unwrap_or(0),
        })
        .to_string()
    }
}

/// Reads an optional non-negative integer field.
fn read_uint(map: &Map<String, Value>, field: &str) -> ProtocolResult<Option<u64>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            ProtocolError::invalid_field(field, "must be a non-negative integer or null")
        }),
    }
}
