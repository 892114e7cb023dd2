//! Transport layer abstraction.

use crate::error::{ClientError, ClientResult};
use incsync_protocol::{PageRequest, PageResponse};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A page transport fetches one page of records from the sync server.
///
/// This trait abstracts the network layer, allowing different
/// implementations (HTTP, loopback to an in-process server, mock for
/// testing).
pub trait PageTransport: Send + Sync {
    /// Sends the request to `url` and returns the decoded page.
    fn fetch_page(&self, url: &str, request: &PageRequest) -> ClientResult<PageResponse>;
}

/// A mock transport serving queued pages, for testing.
///
/// Records every request it receives so tests can assert how the
/// cursor advanced between pages.
#[derive(Debug, Default)]
pub struct MockTransport {
    pages: Mutex<VecDeque<PageResponse>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl MockTransport {
    /// Creates an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a page to be served by the next fetch.
    pub fn push_page(&self, page: PageResponse) {
        self.pages.lock().unwrap().push_back(page);
    }

    /// Returns every request seen so far.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns how many fetches have been served.
    pub fn fetch_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl PageTransport for MockTransport {
    fn fetch_page(&self, _url: &str, request: &PageRequest) -> ClientResult<PageResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::transport_fatal("no mock page queued"))
    }
}
