//! Server facade.

use crate::error::ServerResult;
use crate::query::SyncQuery;
use crate::request::SyncRequest;
use crate::result::Transform;
use crate::settings::SyncSettings;
use incsync_protocol::PageResponse;

/// One sync endpoint: the settings for a table plus request dispatch.
///
/// The transport layer is up to the embedding application; it only
/// needs to hand the request body and a prepared query to
/// `handle_sync` and write the returned JSON back.
///
/// # Example
///
/// ```
/// use incsync_server::{MemoryQuery, SyncEndpoint, SyncSettings, TimeFormat};
///
/// let endpoint = SyncEndpoint::new(SyncSettings::new(TimeFormat::Timestamp));
/// let mut query = MemoryQuery::new(Vec::new());
/// let body = r#"{"type": "modified", "limit": 10}"#;
/// let json = endpoint.handle_sync_json(body, &mut query, None, None).unwrap();
/// assert!(json.contains("\"count\":0"));
/// ```
pub struct SyncEndpoint {
    settings: SyncSettings,
}

impl SyncEndpoint {
    /// Creates an endpoint with the given settings.
    pub fn new(settings: SyncSettings) -> Self {
        Self { settings }
    }

    /// Returns the endpoint settings.
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Parses a request body and serves one page from `query`.
    pub fn handle_sync(
        &self,
        body: &str,
        query: &mut dyn SyncQuery,
        caller_limit: Option<u64>,
        transformer: Option<&dyn Transform>,
    ) -> ServerResult<PageResponse> {
        let request = SyncRequest::from_json(body)?;
        request.do_sync(query, &self.settings, caller_limit, transformer)
    }

    /// Like `handle_sync`, but returns the encoded response body.
    pub fn handle_sync_json(
        &self,
        body: &str,
        query: &mut dyn SyncQuery,
        caller_limit: Option<u64>,
        transformer: Option<&dyn Transform>,
    ) -> ServerResult<String> {
        self.handle_sync(body, query, caller_limit, transformer)
            .map(|page| page.to_json())
    }
}
