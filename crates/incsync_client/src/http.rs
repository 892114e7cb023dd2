//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted behind a trait so any HTTP
//! library (reqwest, ureq, hyper) can carry the protocol.

use crate::error::{ClientError, ClientResult};
use crate::transport::PageTransport;
use incsync_protocol::{PageRequest, PageResponse};

/// HTTP client abstraction.
///
/// Implement this to provide the actual POST transport. The body is
/// the request JSON; the return value must be the response body.
pub trait HttpClient: Send + Sync {
    /// Sends a POST request and returns the response body.
    fn post(&self, url: &str, body: &str) -> Result<String, String>;
}

/// HTTP-based page transport.
///
/// Encodes requests to JSON, POSTs them, and decodes the JSON
/// response. Transport failures surface as retryable
/// `ClientError::Transport`; undecodable responses as protocol errors.
pub struct HttpTransport<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport over the given HTTP client.
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: HttpClient> PageTransport for HttpTransport<C> {
    fn fetch_page(&self, url: &str, request: &PageRequest) -> ClientResult<PageResponse> {
        let body = request.to_json();
        tracing::debug!(url, request = %body, "fetching sync page");

        let response = self
            .client
            .post(url, &body)
            .map_err(ClientError::transport_retryable)?;

        Ok(PageResponse::from_json(&response)?)
    }
}
