//! Record classification and the local model sink.

use crate::error::ClientResult;
use incsync_protocol::{Record, SettingsDescriptor};
use serde_json::Value;

/// The local store a sync stream is applied to.
pub trait ModelSink {
    /// Returns whether an item with this id exists locally.
    fn item_exists(&self, id: u64) -> ClientResult<bool>;

    /// Creates a new local item from a record.
    fn create_item(&mut self, record: &Record) -> ClientResult<()>;

    /// Updates an existing local item from a record.
    fn update_item(&mut self, record: &Record) -> ClientResult<()>;

    /// Deletes the local item with this id.
    fn delete_item(&mut self, id: u64) -> ClientResult<()>;
}

/// What to do with one record, as a pure function of
/// `(exists locally, marked deleted)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Record is new locally: create it.
    Create,
    /// Record exists locally: update it.
    Update,
    /// Record exists locally and is deleted upstream: apply the final
    /// update, then delete. The update may carry data relevant up to
    /// the deletion moment.
    UpdateThenDelete,
    /// Record never existed locally and is already deleted: nothing to do.
    Skip,
}

/// Classifies one record.
pub fn classify(exists_locally: bool, deleted: bool) -> Action {
    match (exists_locally, deleted) {
        (true, false) => Action::Update,
        (true, true) => Action::UpdateThenDelete,
        (false, false) => Action::Create,
        (false, true) => Action::Skip,
    }
}

/// Returns whether a record is marked deleted under the server's
/// declared deletion column: the field is present and truthy.
pub fn is_deleted(record: &Record, settings: &SettingsDescriptor) -> bool {
    record.get(&settings.deleted_at).map_or(false, truthy)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Tally of what one full sync applied to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Items created.
    pub created: u64,
    /// Items updated (including those deleted right after).
    pub updated: u64,
    /// Items deleted.
    pub deleted: u64,
    /// Records skipped because they were deleted before ever arriving.
    pub skipped: u64,
}
