//! Polygon Ingest Handlers
//!
//! One entry point per event kind. Each consumes a raw event, applies
//! filtering, normalization, and bucketing, builds a columnar record, and
//! dispatches a write to the time-bucketed store. Handlers are total: no
//! payload, however malformed, raises to the transport — the failure mode is
//! log-and-drop.
//!
//! # Concurrency
//!
//! Each invocation runs on an independent task with no ordering guarantee.
//! The only shared state is the backfill tracker, which synchronizes
//! internally; everything else is handler-local.

use std::sync::Arc;

use serde_json::Value;

use crate::application::ports::RecordWriter;
use crate::domain::backfill::BackfillTracker;
use crate::domain::bucket::{RecordKind, TimeBucketKey, minute_bucket};
use crate::domain::conditions::is_exchange_summary;
use crate::domain::record::ColumnarRecord;
use crate::domain::symbol::{canonical, has_class_separator};
use crate::infrastructure::metrics;
use crate::infrastructure::polygon::messages::{
    EVENT_AGGREGATE, EVENT_QUOTE, EVENT_STATUS, EVENT_TRADE, RawEvent, decode_events,
};

/// Handlers converting Polygon events into columnar store writes.
pub struct IngestHandlers {
    writer: Arc<dyn RecordWriter>,
    backfill: Arc<BackfillTracker>,
}

impl IngestHandlers {
    /// Create handlers over a record writer and backfill tracker.
    #[must_use]
    pub fn new(writer: Arc<dyn RecordWriter>, backfill: Arc<BackfillTracker>) -> Self {
        Self { writer, backfill }
    }

    /// The shared backfill tracker.
    #[must_use]
    pub fn backfill(&self) -> &Arc<BackfillTracker> {
        &self.backfill
    }

    /// Decode a raw payload and route each contained event by its `ev` tag.
    pub async fn handle_payload(&self, payload: &[u8]) {
        for value in decode_events(payload) {
            self.handle_event(&value).await;
        }
    }

    /// Route a single decoded event.
    pub async fn handle_event(&self, value: &Value) {
        let event = RawEvent::new(value);
        match event.event_type() {
            EVENT_AGGREGATE => self.on_bar(event).await,
            EVENT_TRADE => self.on_trade(event).await,
            EVENT_QUOTE => self.on_quote(event).await,
            EVENT_STATUS => {
                tracing::debug!(
                    status = event.str_field("status"),
                    message = event.str_field("message"),
                    "Feed status"
                );
            }
            other => {
                tracing::debug!(event_type = other, "Ignoring unhandled event type");
            }
        }
    }

    /// Ingest a minute aggregate.
    ///
    /// Multi-class symbols (raw `/` separator) are not supported for bar
    /// aggregation and are discarded outright: no record, no backfill entry.
    /// The source epoch is already a minute-aligned bar start, so it is taken
    /// as-is (millis truncated to seconds) rather than re-bucketed.
    pub async fn on_bar(&self, event: RawEvent<'_>) {
        let symbol = event.str_field("sym");
        if has_class_separator(symbol) {
            metrics::record_bar_discarded();
            tracing::debug!(symbol, "Discarding bar for multi-class symbol");
            return;
        }

        metrics::record_event_received(RecordKind::Ohlcv);

        let open = event.f64_field("o");
        let high = event.f64_field("h");
        let low = event.f64_field("l");
        let close = event.f64_field("c");
        let volume = event.i64_field("v");
        let epoch = event.i64_field("s") / 1000;

        if self.backfill.record_first_seen(symbol, epoch) {
            metrics::set_backfill_symbols(self.backfill.len());
        }

        let key = TimeBucketKey::new(symbol.to_owned(), RecordKind::Ohlcv);
        let record = ColumnarRecord::ohlcv(epoch, open, high, low, close, volume);

        self.dispatch(&key, record, false).await;
    }

    /// Ingest a trade.
    ///
    /// Exchange-summary trades are suppressed before any other work.
    pub async fn on_trade(&self, event: RawEvent<'_>) {
        if is_exchange_summary(&event.condition_codes()) {
            metrics::record_trade_suppressed();
            return;
        }

        metrics::record_event_received(RecordKind::Trade);

        let symbol = canonical(event.str_field("sym"));
        let price = event.f64_field("p");
        let size = event.i64_field("s");
        let (epoch, nanos) = minute_bucket(event.i64_field("t"));

        let key = TimeBucketKey::new(symbol, RecordKind::Trade);
        let record = ColumnarRecord::trade(epoch, nanos, price, size);

        self.dispatch(&key, record, true).await;
    }

    /// Ingest a quote.
    pub async fn on_quote(&self, event: RawEvent<'_>) {
        metrics::record_event_received(RecordKind::Quote);

        let symbol = canonical(event.str_field("sym"));
        let bid_price = event.f64_field("bp");
        let ask_price = event.f64_field("ap");
        let bid_size = event.i64_field("bs");
        let ask_size = event.i64_field("as");
        let (epoch, nanos) = minute_bucket(event.i64_field("t"));

        let key = TimeBucketKey::new(symbol, RecordKind::Quote);
        let record = ColumnarRecord::quote(epoch, nanos, bid_price, ask_price, bid_size, ask_size);

        self.dispatch(&key, record, true).await;
    }

    /// Dispatch a write; failures are logged with the bucket key and dropped.
    async fn dispatch(&self, key: &TimeBucketKey, record: ColumnarRecord, append: bool) {
        if let Err(e) = self.writer.write_record(key, record, append).await {
            metrics::record_write_failure(key.kind());
            tracing::error!(key = %key, error = %e, "Record write failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::application::ports::WriteError;

    /// Captures dispatched writes; optionally fails every write.
    #[derive(Default)]
    struct CapturingWriter {
        writes: Mutex<Vec<(TimeBucketKey, ColumnarRecord, bool)>>,
        fail: bool,
    }

    #[async_trait]
    impl RecordWriter for CapturingWriter {
        async fn write_record(
            &self,
            key: &TimeBucketKey,
            record: ColumnarRecord,
            append: bool,
        ) -> Result<(), WriteError> {
            if self.fail {
                return Err(WriteError::Store("store offline".to_string()));
            }
            self.writes.lock().push((key.clone(), record, append));
            Ok(())
        }
    }

    fn setup() -> (Arc<CapturingWriter>, IngestHandlers) {
        let writer = Arc::new(CapturingWriter::default());
        let handlers = IngestHandlers::new(
            Arc::clone(&writer) as Arc<dyn RecordWriter>,
            Arc::new(BackfillTracker::new()),
        );
        (writer, handlers)
    }

    #[tokio::test]
    async fn bar_produces_overwrite_and_backfill_entry() {
        let (writer, handlers) = setup();

        handlers
            .handle_payload(
                br#"{"ev":"AM","sym":"AAPL","o":150.0,"h":151.0,"l":149.5,"c":150.5,"v":10000,"s":1700000000000}"#,
            )
            .await;

        let writes = writer.writes.lock();
        assert_eq!(writes.len(), 1);
        let (key, record, append) = &writes[0];
        assert_eq!(key.to_string(), "AAPL/1Min/OHLCV");
        assert!(!append);
        assert_eq!(
            *record,
            ColumnarRecord::Ohlcv {
                epoch: 1_700_000_000,
                open: 150.0,
                high: 151.0,
                low: 149.5,
                close: 150.5,
                volume: 10_000,
            }
        );

        assert_eq!(handlers.backfill().first_seen("AAPL"), Some(1_700_000_000));
    }

    #[tokio::test]
    async fn bar_with_class_separator_is_discarded() {
        let (writer, handlers) = setup();

        handlers
            .handle_payload(br#"{"ev":"AM","sym":"BRK/A","o":1.0,"s":1700000000000}"#)
            .await;

        assert!(writer.writes.lock().is_empty());
        assert!(handlers.backfill().is_empty());
    }

    #[tokio::test]
    async fn trade_with_summary_condition_is_suppressed() {
        let (writer, handlers) = setup();

        handlers
            .handle_payload(br#"{"ev":"T","sym":"AAPL","p":150.25,"s":100,"c":[51],"t":1700000000123}"#)
            .await;

        assert!(writer.writes.lock().is_empty());
    }

    #[tokio::test]
    async fn trade_normalizes_symbol_and_buckets_timestamp() {
        let (writer, handlers) = setup();

        handlers
            .handle_payload(br#"{"ev":"T","sym":"BRK/A","p":300.0,"s":5,"t":1700000000123}"#)
            .await;

        let writes = writer.writes.lock();
        assert_eq!(writes.len(), 1);
        let (key, record, append) = &writes[0];
        assert_eq!(key.to_string(), "BRK.A/1Min/TRADE");
        assert!(append);

        let (bucket_epoch, bucket_nanos) = minute_bucket(1_700_000_000_123);
        #[allow(clippy::cast_possible_truncation)]
        let expected_nanos = bucket_nanos as i32;
        assert_eq!(
            *record,
            ColumnarRecord::Trade {
                epoch: bucket_epoch,
                nanoseconds: expected_nanos,
                price: 300.0,
                size: 5,
            }
        );
    }

    #[tokio::test]
    async fn quote_buckets_end_of_minute() {
        let (writer, handlers) = setup();

        handlers
            .handle_payload(
                br#"{"ev":"Q","sym":"MSFT","bp":300.1,"ap":300.2,"bs":10,"as":12,"t":1700000059999}"#,
            )
            .await;

        let writes = writer.writes.lock();
        assert_eq!(writes.len(), 1);
        let (key, record, append) = &writes[0];
        assert_eq!(key.to_string(), "MSFT/1Min/QUOTE");
        assert!(append);
        // 1_700_000_059.999 floors to the minute boundary at 1_700_000_040.
        assert_eq!(record.epoch(), 1_700_000_040);
    }

    #[tokio::test]
    async fn batched_payload_routes_every_event() {
        let (writer, handlers) = setup();

        handlers
            .handle_payload(
                br#"[{"ev":"AM","sym":"SPY","s":60000},
                     {"ev":"T","sym":"SPY","p":1.0,"s":1,"t":61000},
                     {"ev":"Q","sym":"SPY","bp":1.0,"ap":1.1,"bs":1,"as":1,"t":62000},
                     {"ev":"status","status":"connected"}]"#,
            )
            .await;

        let writes = writer.writes.lock();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0].0.kind(), RecordKind::Ohlcv);
        assert_eq!(writes[1].0.kind(), RecordKind::Trade);
        assert_eq!(writes[2].0.kind(), RecordKind::Quote);
    }

    #[tokio::test]
    async fn malformed_payload_still_produces_zero_record() {
        let (writer, handlers) = setup();

        // A quote with every field missing coerces to zeros.
        handlers.handle_payload(br#"{"ev":"Q"}"#).await;

        let writes = writer.writes.lock();
        assert_eq!(writes.len(), 1);
        let (key, record, _) = &writes[0];
        assert_eq!(key.to_string(), "/1Min/QUOTE");
        assert_eq!(record.epoch(), 0);
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let writer = Arc::new(CapturingWriter {
            fail: true,
            ..CapturingWriter::default()
        });
        let handlers = IngestHandlers::new(
            Arc::clone(&writer) as Arc<dyn RecordWriter>,
            Arc::new(BackfillTracker::new()),
        );

        // Must return normally despite the store being down.
        handlers
            .handle_payload(br#"{"ev":"T","sym":"AAPL","p":1.0,"s":1,"t":60000}"#)
            .await;

        assert!(writer.writes.lock().is_empty());
    }

    #[tokio::test]
    async fn backfill_uses_raw_symbol_and_untruncated_epoch() {
        let (_, handlers) = setup();

        // Two bars for the same symbol: only the first epoch sticks.
        handlers
            .handle_payload(br#"{"ev":"AM","sym":"AAPL","s":1700000000000}"#)
            .await;
        handlers
            .handle_payload(br#"{"ev":"AM","sym":"AAPL","s":1700000060000}"#)
            .await;

        assert_eq!(handlers.backfill().first_seen("AAPL"), Some(1_700_000_000));
        assert_eq!(handlers.backfill().len(), 1);
    }
}
