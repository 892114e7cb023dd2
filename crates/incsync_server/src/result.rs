//! Page result assembly.

use crate::settings::SyncSettings;
use incsync_protocol::{PageResponse, Record};
use serde_json::Value;

/// Hook applied to the full row set before it is packaged.
///
/// Implementations may mutate rows in place, e.g. to redact fields the
/// client must not see. No further contract.
pub trait Transform {
    /// Transforms the rows about to be returned to the client.
    fn transform(&self, rows: &mut Vec<Record>);
}

/// Assembles a page from fetched rows and the unlimited match count.
///
/// Every configured timestamp column present on a row is converted to
/// unix time, so timestamps leave the server uniformly regardless of
/// the storage format. Values that cannot be interpreted become null.
pub fn assemble(
    mut rows: Vec<Record>,
    total_matching: u64,
    settings: &SyncSettings,
    transformer: Option<&dyn Transform>,
) -> PageResponse {
    for row in &mut rows {
        for field in settings.time_fields() {
            if let Some(value) = row.get_mut(field) {
                if value.is_null() {
                    continue;
                }
                *value = settings
                    .to_unix_time(value)
                    .map(Value::from)
                    .unwrap_or(Value::Null);
            }
        }
    }

    if let Some(transformer) = transformer {
        transformer.transform(&mut rows);
    }

    PageResponse::from_total(rows, total_matching, settings.describe())
}
