//! Inbound sync request handling.

use crate::error::ServerResult;
use crate::query::SyncQuery;
use crate::result::{assemble, Transform};
use crate::settings::SyncSettings;
use incsync_protocol::{PageRequest, PageResponse, SyncMode};
use std::time::{SystemTime, UNIX_EPOCH};

/// A validated inbound sync request.
///
/// Single use: construct it from the request body, then run `do_sync`
/// against a prepared query. Running it again recomputes the same page
/// from the same cursor; it is not a resume mechanism.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    request: PageRequest,
    // Raw body kept verbatim for request logging.
    raw: String,
}

impl SyncRequest {
    /// Parses and validates a request body.
    pub fn from_json(body: &str) -> ServerResult<Self> {
        let request = PageRequest::from_json(body)?;
        Ok(Self {
            request,
            raw: body.to_string(),
        })
    }

    /// Returns the sync mode.
    pub fn mode(&self) -> SyncMode {
        self.request.mode
    }

    /// Returns the client-requested page limit.
    pub fn limit(&self) -> Option<u64> {
        self.request.limit
    }

    /// Returns the requested watermark.
    pub fn before(&self) -> Option<i64> {
        self.request.before
    }

    /// Returns the cursor timestamp.
    pub fn since(&self) -> Option<i64> {
        self.request.since
    }

    /// Returns the cursor record id.
    pub fn start_id(&self) -> Option<u64> {
        self.request.start_id
    }

    /// Runs the sync against the wall clock.
    ///
    /// `caller_limit` caps the page size regardless of what the client
    /// asked for; the smaller of the two limits wins.
    pub fn do_sync(
        &self,
        query: &mut dyn SyncQuery,
        settings: &SyncSettings,
        caller_limit: Option<u64>,
        transformer: Option<&dyn Transform>,
    ) -> ServerResult<PageResponse> {
        self.do_sync_at(query, settings, caller_limit, transformer, unix_now())
    }

    /// Runs the sync with an explicit clock.
    ///
    /// Exposed so watermark behavior is testable against a fixed `now`.
    pub fn do_sync_at(
        &self,
        query: &mut dyn SyncQuery,
        settings: &SyncSettings,
        caller_limit: Option<u64>,
        transformer: Option<&dyn Transform>,
        now: i64,
    ) -> ServerResult<PageResponse> {
        tracing::info!(request = %self.raw, "starting sync");

        // Upper-bound the timestamp so edits committed this second,
        // or within the grace window, are left for a later page.
        let before = self.request.before.unwrap_or(now);
        settings.apply_before(query, self.request.mode, before, now);

        if let Some(since) = self.request.since {
            settings.apply_since(
                query,
                self.request.mode,
                since,
                self.request.start_id.unwrap_or(0),
            );
        }

        // Count on an independent clone: aggregation must see the
        // filtered but unlimited, unordered query.
        let total_matching = query.clone_query().count();

        settings.apply_order(query, self.request.mode);

        match (self.request.limit, caller_limit) {
            (Some(requested), Some(cap)) => query.take(requested.min(cap)),
            (Some(limit), None) | (None, Some(limit)) => query.take(limit),
            (None, None) => {}
        }

        let rows = query.rows();
        let response = assemble(rows, total_matching, settings, transformer);
        tracing::debug!(result = %response.to_json(), "sync finished");
        Ok(response)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
