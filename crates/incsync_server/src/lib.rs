//! # incsync Server
//!
//! Server-side request handling for the incsync pagination protocol.
//!
//! This crate provides:
//! - `SyncSettings`: column names, time format, grace window, and the
//!   watermark/cursor/ordering predicates
//! - `SyncQuery`: the store query abstraction, with an in-memory
//!   reference implementation
//! - `SyncRequest`: inbound request validation and page execution
//! - `Transform`: a redaction hook over the outgoing row set
//! - `SyncEndpoint`: a small facade tying the above together
//!
//! ## Key invariants
//!
//! - Pages never overlap and never skip rows, even under timestamp
//!   ties, as long as record ids are unique and stable
//! - The watermark never exceeds `now - grace`
//! - The match count is taken before ordering and limiting, on an
//!   independent clone of the query

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod query;
mod request;
mod result;
mod server;
mod settings;

pub use error::{ServerError, ServerResult};
pub use query::{Comparison, Condition, MemoryQuery, SyncQuery};
pub use request::SyncRequest;
pub use result::Transform;
pub use server::SyncEndpoint;
pub use settings::{SyncSettings, TimeFormat};
