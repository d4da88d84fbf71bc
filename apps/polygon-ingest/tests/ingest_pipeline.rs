//! Ingest Pipeline Integration Tests
//!
//! Runs raw feed payloads through the handlers into a real JSONL store and
//! checks what lands on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use polygon_ingest::{
    BackfillTracker, IngestHandlers, JsonlStore, RecordKind, RecordWriter, TimeBucketKey,
};

async fn setup(dir: &std::path::Path) -> (Arc<JsonlStore>, IngestHandlers) {
    let store = Arc::new(JsonlStore::new(dir).await.unwrap());
    let handlers = IngestHandlers::new(
        Arc::clone(&store) as Arc<dyn RecordWriter>,
        Arc::new(BackfillTracker::new()),
    );
    (store, handlers)
}

async fn read_rows(store: &JsonlStore, key: &TimeBucketKey) -> Vec<serde_json::Value> {
    let contents = tokio::fs::read_to_string(store.bucket_path(key))
        .await
        .unwrap();
    contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn bar_lands_as_single_overwritten_row() {
    let dir = tempfile::tempdir().unwrap();
    let (store, handlers) = setup(dir.path()).await;

    handlers
        .handle_payload(
            br#"[{"ev":"AM","sym":"AAPL","o":150.0,"h":151.0,"l":149.5,"c":150.5,"v":10000,"s":1700000000000}]"#,
        )
        .await;
    // A later bar for the same minute bucket key replaces the row.
    handlers
        .handle_payload(
            br#"[{"ev":"AM","sym":"AAPL","o":150.5,"h":152.0,"l":150.0,"c":151.5,"v":12000,"s":1700000060000}]"#,
        )
        .await;

    let key = TimeBucketKey::new("AAPL".to_string(), RecordKind::Ohlcv);
    let rows = read_rows(&store, &key).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Epoch"], 1_700_000_060);
    assert_eq!(rows[0]["Volume"], 12_000);

    // Backfill keeps the first epoch, not the later one.
    assert_eq!(handlers.backfill().first_seen("AAPL"), Some(1_700_000_000));
}

#[tokio::test]
async fn trades_and_quotes_append_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (store, handlers) = setup(dir.path()).await;

    handlers
        .handle_payload(br#"[{"ev":"T","sym":"BRK/A","p":300.0,"s":5,"t":1700000000123}]"#)
        .await;
    handlers
        .handle_payload(br#"[{"ev":"T","sym":"BRK/A","p":300.5,"s":7,"t":1700000001500}]"#)
        .await;

    let trades = TimeBucketKey::new("BRK.A".to_string(), RecordKind::Trade);
    let rows = read_rows(&store, &trades).await;
    assert_eq!(rows.len(), 2);
    // 1_700_000_000.123 floors to the boundary at 1_699_999_980, 20.123s in.
    assert_eq!(rows[0]["Epoch"], 1_699_999_980);
    assert_eq!(rows[0]["Size"], 5);
    assert_eq!(rows[1]["Size"], 7);

    handlers
        .handle_payload(
            br#"[{"ev":"Q","sym":"MSFT","bp":300.1,"ap":300.2,"bs":10,"as":12,"t":1700000059999}]"#,
        )
        .await;

    let quotes = TimeBucketKey::new("MSFT".to_string(), RecordKind::Quote);
    let rows = read_rows(&store, &quotes).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Epoch"], 1_700_000_040);
    assert_eq!(rows[0]["BidSize"], 10);
    assert_eq!(rows[0]["AskSize"], 12);
}

#[tokio::test]
async fn suppressed_and_discarded_events_leave_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let (store, handlers) = setup(dir.path()).await;

    // Exchange-summary trade and multi-class bar.
    handlers
        .handle_payload(
            br#"[{"ev":"T","sym":"AAPL","p":150.25,"s":100,"c":[51],"t":1700000000123},
                 {"ev":"AM","sym":"BRK/A","o":1.0,"s":1700000000000}]"#,
        )
        .await;

    let mut entries = tokio::fs::read_dir(store.data_dir()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
    assert!(handlers.backfill().is_empty());
}

#[tokio::test]
async fn mixed_batch_fans_out_to_all_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let (store, handlers) = setup(dir.path()).await;

    handlers
        .handle_payload(
            br#"[{"ev":"status","status":"connected"},
                 {"ev":"AM","sym":"SPY","o":1.0,"h":1.0,"l":1.0,"c":1.0,"v":1,"s":60000},
                 {"ev":"T","sym":"SPY","p":1.0,"s":1,"t":61000},
                 {"ev":"Q","sym":"SPY","bp":1.0,"ap":1.1,"bs":1,"as":1,"t":62000}]"#,
        )
        .await;

    for kind in [RecordKind::Ohlcv, RecordKind::Trade, RecordKind::Quote] {
        let key = TimeBucketKey::new("SPY".to_string(), kind);
        let rows = read_rows(&store, &key).await;
        assert_eq!(rows.len(), 1, "missing row for {kind:?}");
    }
}
