//! # incsync Protocol
//!
//! Wire types and JSON codecs for the incsync incremental
//! synchronization protocol.
//!
//! This crate provides:
//! - `SyncMode` for selecting the tracked timestamp column
//! - `PageRequest` / `PageResponse` with strict wire validation
//! - `SettingsDescriptor` for server column names
//! - `Record`, the untyped field map both sides exchange
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod mode;
mod record;
mod request;
mod response;

pub use error::{ProtocolError, ProtocolResult};
pub use mode::SyncMode;
pub use record::{record_id, Record};
pub use request::PageRequest;
pub use response::{PageResponse, SettingsDescriptor};
