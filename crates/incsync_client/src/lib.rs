//! # incsync Client
//!
//! Client-side paging engine for the incsync pagination protocol.
//!
//! This crate provides:
//! - `SyncRequest`: cursor state, page fetching, full-stream dispatch
//! - `RecordStream`: a lazy, restartable flat view over all pages
//! - `ModelSink` and the create/update/delete classification
//! - `PageTransport` / `HttpTransport` / `MockTransport`
//!
//! ## Architecture
//!
//! The client drives repeated page requests into one logical stream:
//! each observed record moves the cursor to its own `(timestamp, id)`,
//! and the next page is requested from `(timestamp, id + 1)`. The
//! server's tie-inclusive cursor predicate makes the combination
//! skip-free and duplicate-free even when many records share a
//! timestamp.
//!
//! Everything is synchronous and single-threaded; page N+1 depends on
//! the last record of page N, so there is no useful fetch parallelism.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod http;
mod request;
mod sink;
mod stream;
mod transport;

pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, HttpTransport};
pub use request::{RequestOptions, SyncRequest};
pub use sink::{classify, is_deleted, Action, ModelSink, SyncReport};
pub use stream::{RecordStream, Remaining};
pub use transport::{MockTransport, PageTransport};
