//! Page response message.

use crate::error::{ProtocolError, ProtocolResult};
use crate::record::Record;
use serde_json::{json, Value};

/// Names of the server's timestamp columns, shipped with every page so
/// client-side deletion detection does not depend on the server schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDescriptor {
    /// Column holding the creation timestamp.
    pub created_at: String,
    /// Column holding the modification timestamp.
    pub updated_at: String,
    /// Column whose non-null value marks a soft-deleted record.
    pub deleted_at: String,
}

impl SettingsDescriptor {
    /// Creates a descriptor with the given column names.
    pub fn new(
        created_at: impl Into<String>,
        updated_at: impl Into<String>,
        deleted_at: impl Into<String>,
    ) -> Self {
        Self {
            created_at: created_at.into(),
            updated_at: updated_at.into(),
            deleted_at: deleted_at.into(),
        }
    }

    /// Encodes to the wire JSON object.
    pub fn to_value(&self) -> Value {
        json!({
            "createdAtName": self.created_at,
            "updatedAtName": self.updated_at,
            "deletedAtName": self.deleted_at,
        })
    }

    /// Decodes from the wire JSON object.
    pub fn from_value(value: &Value) -> ProtocolResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            ProtocolError::invalid_field("settings", "must be an object")
        })?;

        let get = |name: &str| -> ProtocolResult<String> {
            map.get(name)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| ProtocolError::invalid_field(name, "must be a string"))
        };

        Ok(Self {
            created_at: get("createdAtName")?,
            updated_at: get("updatedAtName")?,
            deleted_at: get("deletedAtName")?,
        })
    }
}

impl Default for SettingsDescriptor {
    fn default() -> Self {
        Self::new("created_at", "updated_at", "deleted_at")
    }
}

/// One page of sync results.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    /// Number of records in this page.
    pub count: u64,
    /// Number of matching records the server still holds beyond this page.
    pub remaining: u64,
    /// Server column names.
    pub settings: SettingsDescriptor,
    /// Records in ascending `(timestamp, id)` order.
    pub data: Vec<Record>,
}

impl PageResponse {
    /// Packages a page from the fetched rows and the unlimited match count.
    ///
    /// `remaining` is clamped at zero in case concurrent writes shrank
    /// the table between the count query and the data query.
    pub fn from_total(data: Vec<Record>, total_matching: u64, settings: SettingsDescriptor) -> Self {
        let count = data.len() as u64;
        Self {
            count,
            remaining: total_matching.saturating_sub(count),
            settings,
            data,
        }
    }

    /// Encodes to the JSON wire form.
    pub fn to_json(&self) -> String {
        json!({
            "count": self.count,
            "remaining": self.remaining,
            "settings": self.settings.to_value(),
            "data": self.data,
        })
        .to_string()
    }

    /// Decodes from the JSON wire form.
    pub fn from_json(body: &str) -> ProtocolResult<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
        let map = value
            .as_object()
            .ok_or_else(|| ProtocolError::MalformedJson("expected a JSON object".into()))?;

        let count = map
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| ProtocolError::invalid_field("count", "must be a non-negative integer"))?;

        let remaining = map.get("remaining").and_then(Value::as_u64).ok_or_else(|| {
            ProtocolError::invalid_field("remaining", "must be a non-negative integer")
        })?;

        let settings = map
            .get("settings")
            .map(SettingsDescriptor::from_value)
            .transpose()?
            .ok_or_else(|| ProtocolError::invalid_field("settings", "missing"))?;

        let rows = map
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| ProtocolError::invalid_field("data", "must be an array"))?;

        let data = rows
            .iter()
            .map(|row| {
                row.as_object()
                    .cloned()
                    .ok_or_else(|| ProtocolError::invalid_field("data", "rows must be objects"))
            })
            .collect::<ProtocolResult<Vec<Record>>>()?;

        Ok(Self {
            count,
            remaining,
            settings,
            data,
        })
    }
}
