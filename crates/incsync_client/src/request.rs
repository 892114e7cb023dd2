//! Client-side sync request.

use crate::error::{ClientError, ClientResult};
use crate::sink::{classify, is_deleted, Action, ModelSink, SyncReport};
use crate::stream::RecordStream;
use crate::transport::PageTransport;
use chrono::{DateTime, NaiveDateTime};
use incsync_protocol::{
    record_id, PageRequest, PageResponse, SettingsDescriptor, SyncMode,
};

/// Datetime layout accepted by `set_from_str`.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Options for a client sync request.
///
/// Each field maps onto one wire field; unset cursor fields mean "from
/// the beginning".
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    /// Whether to sync by creation or modification time.
    pub mode: SyncMode,
    /// Page size the client asks the server for.
    pub limit: Option<u64>,
    /// Upper watermark, unix seconds.
    pub before: Option<i64>,
    /// Starting cursor timestamp.
    pub since: Option<i64>,
    /// Starting cursor record id.
    pub start_id: Option<u64>,
}

impl RequestOptions {
    /// Creates options with only the mode set.
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            limit: None,
            before: None,
            since: None,
            start_id: None,
        }
    }

    /// Sets the requested page size.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the watermark.
    pub fn with_before(mut self, before: i64) -> Self {
        self.before = Some(before);
        self
    }

    /// Sets the starting cursor.
    pub fn with_cursor(mut self, since: i64, start_id: u64) -> Self {
        self.since = Some(since);
        self.start_id = Some(start_id);
        self
    }
}

/// A long-lived client request: the sync parameters, the cursor they
/// carry, and the transport to reach the server.
///
/// The transport is injected at construction; the request itself knows
/// nothing about HTTP.
pub struct SyncRequest {
    url: String,
    request: PageRequest,
    settings: Option<SettingsDescriptor>,
    transport: Box<dyn PageTransport>,
}

impl SyncRequest {
    /// Creates a request against `url`.
    pub fn new(url: impl Into<String>, options: RequestOptions, transport: Box<dyn PageTransport>) -> Self {
        let request = PageRequest {
            mode: options.mode,
            limit: options.limit,
            before: options.before,
            since: options.since,
            start_id: options.start_id,
        };
        Self {
            url: url.into(),
            request,
            settings: None,
            transport,
        }
    }

    /// Returns the sync mode.
    pub fn mode(&self) -> SyncMode {
        self.request.mode
    }

    /// Returns the current cursor timestamp.
    pub fn since(&self) -> Option<i64> {
        self.request.since
    }

    /// Returns the current cursor record id.
    pub fn start_id(&self) -> Option<u64> {
        self.request.start_id
    }

    /// Returns the column names declared by the server, once a page
    /// has been fetched. Until then deletion detection has no column
    /// to look at, and nothing is considered deleted.
    pub fn settings(&self) -> Option<&SettingsDescriptor> {
        self.settings.as_ref()
    }

    /// Moves the cursor to `(time, id)`.
    pub fn set_from(&mut self, time: i64, id: u64) {
        self.request.since = Some(time);
        self.request.start_id = Some(id);
    }

    /// Moves the cursor to `(time, id)` with the time given as a
    /// `YYYY-MM-DD HH:MM:SS` or RFC 3339 string.
    pub fn set_from_str(&mut self, time: &str, id: u64) -> ClientResult<()> {
        let unix = parse_time(time).ok_or_else(|| ClientError::TimeParse(time.to_string()))?;
        self.set_from(unix, id);
        Ok(())
    }

    /// Fetches one page at the current cursor.
    ///
    /// Remembers the server's settings descriptor for deletion
    /// classification. Transport failures propagate untouched.
    pub fn get_data(&mut self) -> ClientResult<PageResponse> {
        let page = self.transport.fetch_page(&self.url, &self.request)?;
        self.settings = Some(page.settings.clone());
        Ok(page)
    }

    /// Turns this request into a lazy stream over all its pages.
    pub fn into_stream(self) -> RecordStream {
        RecordStream::new(self)
    }

    /// Drives the full stream and applies every record to `sink`.
    pub fn fetch_into(self, sink: &mut dyn ModelSink) -> ClientResult<SyncReport> {
        let mut stream = self.into_stream();
        let mut report = SyncReport::default();

        while let Some(record) = stream.current()? {
            let id = record_id(&record)
                .ok_or_else(|| ClientError::Record("record without numeric id".into()))?;
            let descriptor = stream.settings().cloned().unwrap_or_default();
            let deleted = is_deleted(&record, &descriptor);
            let exists = sink.item_exists(id)?;

            match classify(exists, deleted) {
                Action::Create => {
                    sink.create_item(&record)?;
                    report.created += 1;
                }
                Action::Update => {
                    sink.update_item(&record)?;
                    report.updated += 1;
                }
                Action::UpdateThenDelete => {
                    sink.update_item(&record)?;
                    sink.delete_item(id)?;
                    report.updated += 1;
                    report.deleted += 1;
                }
                Action::Skip => {
                    report.skipped += 1;
                }
            }
            stream.advance();
        }

        tracing::debug!(?report, "sync applied");
        Ok(report)
    }
}

/// Parses a cursor time string: unix seconds, the datetime layout, or
/// RFC 3339.
pub(crate) fn parse_time(s: &str) -> Option<i64> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Some(dt.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp())
}
