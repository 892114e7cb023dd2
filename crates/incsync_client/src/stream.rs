//! Lazy paged record stream.

use crate::error::{ClientError, ClientResult};
use crate::request::{parse_time, SyncRequest};
use incsync_protocol::{record_id, Record, SettingsDescriptor, SyncMode};
use serde_json::Value;

/// How many matching records the server still holds beyond what has
/// been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// No page fetched yet; the next `has_next` must fetch to find out.
    Unknown,
    /// The `remaining` count reported by the last page.
    Count(u64),
}

/// A lazy, forward-only view over every record a request can reach,
/// flattened across pages.
///
/// The stream fetches a page only when the read position runs past the
/// buffer and the server reported records remaining. Rewinding via
/// `restart` replays the buffer; nothing is ever re-fetched.
///
/// Observing a record through `current` advances the fetch cursor to
/// that record's own `(timestamp, id)`; the next page is requested
/// from `(timestamp, id + 1)`. Together with the server's tie-inclusive
/// cursor predicate this yields every record exactly once.
pub struct RecordStream {
    request: SyncRequest,
    buffer: Vec<Record>,
    position: usize,
    cursor: Option<(i64, u64)>,
    remaining: Remaining,
}

impl RecordStream {
    /// Creates a stream over `request`, starting at its configured cursor.
    pub fn new(request: SyncRequest) -> Self {
        Self {
            request,
            buffer: Vec::new(),
            position: 0,
            cursor: None,
            remaining: Remaining::Unknown,
        }
    }

    /// Returns the server's settings descriptor, once known.
    pub fn settings(&self) -> Option<&SettingsDescriptor> {
        self.request.settings()
    }

    /// Returns the remaining-count state.
    pub fn remaining(&self) -> Remaining {
        self.remaining
    }

    /// Returns whether a record is available at the read position,
    /// fetching the next page if needed.
    pub fn has_next(&mut self) -> ClientResult<bool> {
        if self.position < self.buffer.len() {
            return Ok(true);
        }
        if self.remaining == Remaining::Count(0) {
            return Ok(false);
        }

        self.fetch_page()?;
        Ok(self.position < self.buffer.len())
    }

    /// Returns the record at the read position, or `None` when the
    /// stream is exhausted.
    ///
    /// Observing a record moves the fetch cursor to it, so the next
    /// page resumes after the last record actually seen.
    pub fn current(&mut self) -> ClientResult<Option<Record>> {
        if !self.has_next()? {
            return Ok(None);
        }

        let record = self.buffer[self.position].clone();
        let id = record_id(&record)
            .ok_or_else(|| ClientError::Record("record without numeric id".into()))?;
        let time = self.record_time(&record)?;
        self.cursor = Some((time, id));
        Ok(Some(record))
    }

    /// Moves the read position one record forward. Never fetches.
    pub fn advance(&mut self) {
        self.position += 1;
    }

    /// Rewinds the read position to the first buffered record.
    pub fn restart(&mut self) {
        self.position = 0;
    }

    fn fetch_page(&mut self) -> ClientResult<()> {
        if let Some((time, id)) = self.cursor {
            self.request.set_from(time, id + 1);
        }

        let page = self.request.get_data()?;
        // An empty page cannot advance the cursor; the stream is drained
        // no matter what the server claims remains.
        self.remaining = if page.data.is_empty() {
            Remaining::Count(0)
        } else {
            Remaining::Count(page.remaining)
        };
        self.buffer.extend(page.data);
        Ok(())
    }

    /// Extracts the cursor timestamp of a record: the creation or
    /// modification column named by the server, depending on mode.
    fn record_time(&self, record: &Record) -> ClientResult<i64> {
        let descriptor = self.settings().cloned().unwrap_or_default();
        let field = match self.request.mode() {
            SyncMode::New => &descriptor.created_at,
            SyncMode::Modified => &descriptor.updated_at,
        };

        let value = record
            .get(field)
            .ok_or_else(|| ClientError::Record(format!("record without `{field}`")))?;

        match value {
            Value::Number(_) => value
                .as_i64()
                .ok_or_else(|| ClientError::Record(format!("`{field}` is not an integer"))),
            Value::String(s) => parse_time(s)
                .ok_or_else(|| ClientError::Record(format!("`{field}` is not a timestamp"))),
            _ => Err(ClientError::Record(format!("`{field}` is not a timestamp"))),
        }
    }
}
