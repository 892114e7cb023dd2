//! Record representation.

use serde_json::{Map, Value};

/// A single synced record: an untyped field map, always carrying at
/// least an `id` plus whichever timestamp fields the server schema has.
pub type Record = Map<String, Value>;

/// Extracts the numeric `id` of a record, if present.
pub fn record_id(record: &Record) -> Option<u64> {
    record.get("id").and_then(Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_extraction() {
        let mut record = Record::new();
        record.insert("id".into(), json!(42));
        assert_eq!(record_id(&record), Some(42));

        record.insert("id".into(), json!("42"));
        assert_eq!(record_id(&record), None);

        record.remove("id");
        assert_eq!(record_id(&record), None);
    }
}
