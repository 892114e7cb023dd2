//! Integration tests for the client engine against the real server crate.

use incsync_client::{
    ClientError, ClientResult, ModelSink, PageTransport, RequestOptions, SyncRequest,
};
use incsync_protocol::{record_id, PageRequest, PageResponse, Record, SyncMode};
use incsync_server::{MemoryQuery, SyncEndpoint, SyncSettings, TimeFormat};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A transport that serves pages straight from an in-process endpoint.
struct LoopbackTransport {
    endpoint: SyncEndpoint,
    records: Vec<Record>,
    fetches: AtomicUsize,
}

impl LoopbackTransport {
    fn new(settings: SyncSettings, records: Vec<Record>) -> Self {
        Self {
            endpoint: SyncEndpoint::new(settings),
            records,
            fetches: AtomicUsize::new(0),
        }
    }
}

impl PageTransport for LoopbackTransport {
    fn fetch_page(&self, _url: &str, request: &PageRequest) -> ClientResult<PageResponse> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut query = MemoryQuery::new(self.records.clone());
        self.endpoint
            .handle_sync(&request.to_json(), &mut query, None, None)
            .map_err(|e| ClientError::transport_fatal(e.to_string()))
    }
}

/// Shares one loopback transport between the test and the request.
struct SharedTransport(Arc<LoopbackTransport>);

impl PageTransport for SharedTransport {
    fn fetch_page(&self, url: &str, request: &PageRequest) -> ClientResult<PageResponse> {
        self.0.fetch_page(url, request)
    }
}

fn record(id: u64, updated_at: i64, deleted_at: Option<i64>) -> Record {
    let mut map = Record::new();
    map.insert("id".into(), json!(id));
    map.insert("created_at".into(), json!(updated_at));
    map.insert("updated_at".into(), json!(updated_at));
    if let Some(deleted) = deleted_at {
        map.insert("deleted_at".into(), json!(deleted));
    }
    map
}

/// The five-record tie scenario: timestamps [1, 1, 1, 2, 3].
fn tied_records() -> Vec<Record> {
    vec![
        record(1, 1, None),
        record(2, 1, None),
        record(3, 1, None),
        record(4, 1, None),
        record(5, 2, None),
    ]
}

fn drain_ids(options: RequestOptions, records: Vec<Record>) -> (Vec<u64>, usize) {
    let transport = Arc::new(LoopbackTransport::new(
        SyncSettings::new(TimeFormat::Timestamp),
        records,
    ));
    let request = SyncRequest::new(
        "loopback://items",
        options,
        Box::new(SharedTransport(Arc::clone(&transport))),
    );

    let mut stream = request.into_stream();
    let mut ids = Vec::new();
    while let Some(record) = stream.current().unwrap() {
        ids.push(record_id(&record).unwrap());
        stream.advance();
    }
    (ids, transport.fetches.load(Ordering::SeqCst))
}

#[test]
fn tied_timestamp_page_sequence() {
    // Drive the pages by hand to observe the metadata of each.
    let records = vec![
        record(1, 1, None),
        record(2, 1, None),
        record(3, 1, None),
        record(4, 2, None),
        record(5, 3, None),
    ];
    let transport = LoopbackTransport::new(SyncSettings::new(TimeFormat::Timestamp), records);
    let mut request = SyncRequest::new(
        "loopback://items",
        RequestOptions::new(SyncMode::Modified)
            .with_limit(2)
            .with_cursor(0, 0),
        Box::new(transport),
    );

    let page = request.get_data().unwrap();
    let ids: Vec<u64> = page.data.iter().map(|r| record_id(r).unwrap()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(page.remaining, 3);

    request.set_from(1, 3);
    let page = request.get_data().unwrap();
    let ids: Vec<u64> = page.data.iter().map(|r| record_id(r).unwrap()).collect();
    assert_eq!(ids, vec![3, 4]);
    assert_eq!(page.remaining, 1);

    request.set_from(2, 5);
    let page = request.get_data().unwrap();
    let ids: Vec<u64> = page.data.iter().map(|r| record_id(r).unwrap()).collect();
    assert_eq!(ids, vec![5]);
    assert_eq!(page.remaining, 0);
}

#[test]
fn stream_yields_every_record_once() {
    let (ids, fetches) = drain_ids(
        RequestOptions::new(SyncMode::Modified).with_limit(2),
        tied_records(),
    );
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(fetches, 3);
}

#[test]
fn stream_stops_after_remaining_zero() {
    let transport = Arc::new(LoopbackTransport::new(
        SyncSettings::new(TimeFormat::Timestamp),
        tied_records(),
    ));
    let request = SyncRequest::new(
        "loopback://items",
        RequestOptions::new(SyncMode::Modified).with_limit(10),
        Box::new(SharedTransport(Arc::clone(&transport))),
    );

    let mut stream = request.into_stream();
    while stream.current().unwrap().is_some() {
        stream.advance();
    }
    // One page covered everything; exhaustion is known without another fetch.
    assert!(!stream.has_next().unwrap());
    assert_eq!(transport.fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn datetime_store_yields_unix_timestamps() {
    let settings = SyncSettings::new(TimeFormat::DateTime);
    let mut row = Record::new();
    row.insert("id".into(), json!(1));
    row.insert("created_at".into(), json!("1970-01-01 00:01:40"));
    row.insert("updated_at".into(), json!("1970-01-01 00:01:40"));

    let transport = LoopbackTransport::new(settings, vec![row]);
    let mut request = SyncRequest::new(
        "loopback://items",
        RequestOptions::new(SyncMode::Modified),
        Box::new(transport),
    );

    let page = request.get_data().unwrap();
    assert_eq!(page.data[0]["updated_at"], json!(100));
}

#[derive(Default)]
struct MemorySink {
    items: HashMap<u64, Record>,
    ops: Vec<String>,
}

impl ModelSink for MemorySink {
    fn item_exists(&self, id: u64) -> ClientResult<bool> {
        Ok(self.items.contains_key(&id))
    }

    fn create_item(&mut self, record: &Record) -> ClientResult<()> {
        let id = record_id(record).unwrap();
        self.items.insert(id, record.clone());
        self.ops.push(format!("create:{id}"));
        Ok(())
    }

    fn update_item(&mut self, record: &Record) -> ClientResult<()> {
        let id = record_id(record).unwrap();
        self.items.insert(id, record.clone());
        self.ops.push(format!("update:{id}"));
        Ok(())
    }

    fn delete_item(&mut self, id: u64) -> ClientResult<()> {
        self.items.remove(&id);
        self.ops.push(format!("delete:{id}"));
        Ok(())
    }
}

#[test]
fn fetch_into_classifies_records() {
    let records = vec![
        record(1, 1, None),    // exists locally, live      -> update
        record(2, 2, Some(5)), // exists locally, deleted   -> update then delete
        record(3, 3, None),    // new, live                 -> create
        record(4, 4, Some(5)), // new, deleted              -> skip
    ];
    let transport = LoopbackTransport::new(SyncSettings::new(TimeFormat::Timestamp), records);
    let request = SyncRequest::new(
        "loopback://items",
        RequestOptions::new(SyncMode::Modified),
        Box::new(transport),
    );

    let mut sink = MemorySink::default();
    sink.items.insert(1, record(1, 0, None));
    sink.items.insert(2, record(2, 0, None));

    let report = request.fetch_into(&mut sink).unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 2);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.skipped, 1);

    assert_eq!(
        sink.ops,
        vec!["update:1", "update:2", "delete:2", "create:3"]
    );
    assert!(sink.items.contains_key(&1));
    assert!(!sink.items.contains_key(&2));
    assert!(sink.items.contains_key(&3));
    assert!(!sink.items.contains_key(&4));
}

#[test]
fn fetch_into_uses_declared_deletion_column() {
    let settings = SyncSettings::new(TimeFormat::Timestamp).with_deleted_at("removed_on");
    let mut row = record(1, 1, None);
    row.insert("removed_on".into(), json!(9));

    let transport = LoopbackTransport::new(settings, vec![row]);
    let request = SyncRequest::new(
        "loopback://items",
        RequestOptions::new(SyncMode::Modified),
        Box::new(transport),
    );

    let mut sink = MemorySink::default();
    let report = request.fetch_into(&mut sink).unwrap();
    assert_eq!(report.skipped, 1);
    assert!(sink.items.is_empty());
}

proptest! {
    /// Whatever the page size and however the timestamps tie, a full
    /// iteration yields every record exactly once, in ascending
    /// (timestamp, id) order.
    #[test]
    fn pagination_is_safe_under_ties(
        timestamps in proptest::collection::vec(1i64..5, 1..25),
        limit in 1u64..8,
    ) {
        let records: Vec<Record> = timestamps
            .iter()
            .enumerate()
            .map(|(i, &t)| record(i as u64 + 1, t, None))
            .collect();

        let mut expected: Vec<(i64, u64)> = timestamps
            .iter()
            .enumerate()
            .map(|(i, &t)| (t, i as u64 + 1))
            .collect();
        expected.sort_unstable();
        let expected: Vec<u64> = expected.into_iter().map(|(_, id)| id).collect();

        let (ids, _) = drain_ids(
            RequestOptions::new(SyncMode::Modified).with_limit(limit),
            records,
        );
        prop_assert_eq!(ids, expected);
    }
}

#[test]
fn malformed_server_rejection_surfaces_as_transport_error() {
    // The loopback maps server-side validation failures onto transport
    // errors, the way a proxy would pass through an upstream 4xx.
    let transport = LoopbackTransport::new(
        SyncSettings::new(TimeFormat::Timestamp),
        tied_records(),
    );

    struct BadBodyTransport(LoopbackTransport);
    impl PageTransport for BadBodyTransport {
        fn fetch_page(&self, _url: &str, _request: &PageRequest) -> ClientResult<PageResponse> {
            let mut query = MemoryQuery::new(self.0.records.clone());
            self.0
                .endpoint
                .handle_sync("not json", &mut query, None, None)
                .map_err(|e| ClientError::transport_fatal(e.to_string()))
        }
    }

    let mut request = SyncRequest::new(
        "loopback://items",
        RequestOptions::new(SyncMode::Modified),
        Box::new(BadBodyTransport(transport)),
    );
    let err = request.get_data().unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
}
