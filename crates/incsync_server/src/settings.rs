//! Server-side sync settings.
//!
//! Settings translate between the store's native time representation
//! and unix time, and build the three predicates a sync query needs:
//! the `before` watermark, the `(since, start_id)` cursor, and the
//! `(column, id)` ordering.

use crate::query::{Comparison, Condition, SyncQuery};
use chrono::{DateTime, NaiveDateTime, Utc};
use incsync_protocol::{SettingsDescriptor, SyncMode};
use serde_json::Value;

/// Datetime column layout used by `TimeFormat::DateTime`.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How the store encodes its timestamp columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// Columns hold unix timestamps.
    Timestamp,
    /// Columns hold `YYYY-MM-DD HH:MM:SS` strings (UTC).
    DateTime,
}

/// Settings for serving sync requests against one table.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    time_format: TimeFormat,
    created_at: String,
    updated_at: String,
    deleted_at: String,
    grace: i64,
}

impl SyncSettings {
    /// Creates settings with the default column names
    /// (`created_at`, `updated_at`, `deleted_at`) and no grace window.
    pub fn new(time_format: TimeFormat) -> Self {
        Self {
            time_format,
            created_at: "created_at".into(),
            updated_at: "updated_at".into(),
            deleted_at: "deleted_at".into(),
            grace: 0,
        }
    }

    /// Sets the creation timestamp column name.
    pub fn with_created_at(mut self, name: impl Into<String>) -> Self {
        self.created_at = name.into();
        self
    }

    /// Sets the modification timestamp column name.
    pub fn with_updated_at(mut self, name: impl Into<String>) -> Self {
        self.updated_at = name.into();
        self
    }

    /// Sets the soft-delete timestamp column name.
    pub fn with_deleted_at(mut self, name: impl Into<String>) -> Self {
        self.deleted_at = name.into();
        self
    }

    /// Sets the grace window in seconds.
    ///
    /// The watermark never exceeds `now - grace`, so rows whose commit
    /// is still in flight within the window are left for a later page.
    pub fn with_grace(mut self, seconds: i64) -> Self {
        self.grace = seconds;
        self
    }

    /// Returns the grace window in seconds.
    pub fn grace(&self) -> i64 {
        self.grace
    }

    /// Returns the column that drives cursoring for `mode`.
    pub fn column_for(&self, mode: SyncMode) -> &str {
        match mode {
            SyncMode::New => &self.created_at,
            SyncMode::Modified => &self.updated_at,
        }
    }

    /// Returns the names of all timestamp columns.
    pub fn time_fields(&self) -> [&str; 3] {
        [&self.created_at, &self.updated_at, &self.deleted_at]
    }

    /// Returns the descriptor shipped to clients with every page.
    pub fn describe(&self) -> SettingsDescriptor {
        SettingsDescriptor::new(&self.created_at, &self.updated_at, &self.deleted_at)
    }

    /// Converts a unix timestamp to the store's native representation.
    pub fn from_unix_time(&self, time: i64) -> Value {
        match self.time_format {
            TimeFormat::Timestamp => Value::from(time),
            TimeFormat::DateTime => DateTime::<Utc>::from_timestamp(time, 0)
                .map(|dt| Value::from(dt.format(DATETIME_FORMAT).to_string()))
                .unwrap_or(Value::Null),
        }
    }

    /// Converts a native time value back to a unix timestamp.
    ///
    /// Accepts a number, a numeric string, or a datetime string.
    /// Returns `None` when the value cannot be interpreted.
    pub fn to_unix_time(&self, value: &Value) -> Option<i64> {
        match value {
            Value::Number(_) => value.as_i64(),
            Value::String(s) => parse_time_string(s),
            _ => None,
        }
    }

    /// Adds the watermark predicate: `column(mode) < min(before, now - grace)`.
    pub fn apply_before(&self, query: &mut dyn SyncQuery, mode: SyncMode, before: i64, now: i64) {
        let cutoff = before.min(now - self.grace);
        query.constrain(Condition::new(
            self.column_for(mode),
            Comparison::Lt,
            self.from_unix_time(cutoff),
        ));
    }

    /// Adds the cursor predicate:
    /// `column > since OR (column = since AND id >= start_id)`.
    ///
    /// Together with the client requesting `last_id + 1` as the next
    /// `start_id`, this guarantees no row is skipped or repeated across
    /// pages even when many rows share a timestamp.
    pub fn apply_since(
        &self,
        query: &mut dyn SyncQuery,
        mode: SyncMode,
        since: i64,
        start_id: u64,
    ) {
        let column = self.column_for(mode);
        let time = self.from_unix_time(since);
        query.constrain_any(vec![
            vec![Condition::new(column, Comparison::Gt, time.clone())],
            vec![
                Condition::new(column, Comparison::Eq, time),
                Condition::new("id", Comparison::Ge, Value::from(start_id)),
            ],
        ]);
    }

    /// Orders ascending by `(column(mode), id)`.
    ///
    /// Must run after the match count has been taken; ordering can
    /// interfere with aggregation in some store engines.
    pub fn apply_order(&self, query: &mut dyn SyncQuery, mode: SyncMode) {
        let column = self.column_for(mode).to_string();
        query.order_by(&column);
        query.order_by("id");
    }
}

fn parse_time_string(s: &str) -> Option<i64> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Some(dt.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}
