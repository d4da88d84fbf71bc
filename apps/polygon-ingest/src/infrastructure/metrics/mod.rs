//! Prometheus Metrics Module
//!
//! Exposes ingest metrics via Prometheus format for monitoring. The exporter
//! serves `/metrics` on its own HTTP listener.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::domain::bucket::RecordKind;

static METRICS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the Prometheus recorder serving on the given port.
///
/// A port of 0 skips exporter installation; recording becomes a no-op.
/// Subsequent calls are ignored.
///
/// # Errors
///
/// Returns an error if the exporter cannot bind its listener.
pub fn init_metrics(port: u16) -> Result<(), BuildError> {
    if port == 0 || METRICS_INITIALIZED.get().is_some() {
        return Ok(());
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    register_metrics();
    let _ = METRICS_INITIALIZED.set(());
    Ok(())
}

fn register_metrics() {
    describe_counter!(
        "polygon_ingest_events_received_total",
        "Total feed events accepted for ingestion, by record kind"
    );
    describe_counter!(
        "polygon_ingest_trades_suppressed_total",
        "Trades suppressed by the exchange-summary condition filter"
    );
    describe_counter!(
        "polygon_ingest_bars_discarded_total",
        "Bars discarded for carrying a multi-class symbol"
    );
    describe_counter!(
        "polygon_ingest_write_failures_total",
        "Record writes that the store rejected, by record kind"
    );
    describe_gauge!(
        "polygon_ingest_backfill_symbols",
        "Symbols with a recorded first-seen epoch"
    );
}

const fn kind_label(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Ohlcv => "ohlcv",
        RecordKind::Trade => "trade",
        RecordKind::Quote => "quote",
    }
}

/// Record a feed event accepted for ingestion.
pub fn record_event_received(kind: RecordKind) {
    counter!(
        "polygon_ingest_events_received_total",
        "kind" => kind_label(kind)
    )
    .increment(1);
}

/// Record a trade suppressed by the condition filter.
pub fn record_trade_suppressed() {
    counter!("polygon_ingest_trades_suppressed_total").increment(1);
}

/// Record a bar discarded for its multi-class symbol.
pub fn record_bar_discarded() {
    counter!("polygon_ingest_bars_discarded_total").increment(1);
}

/// Record a failed store write.
pub fn record_write_failure(kind: RecordKind) {
    counter!(
        "polygon_ingest_write_failures_total",
        "kind" => kind_label(kind)
    )
    .increment(1);
}

/// Update the tracked backfill symbol count.
#[allow(clippy::cast_precision_loss)]
pub fn set_backfill_symbols(count: usize) {
    gauge!("polygon_ingest_backfill_symbols").set(count as f64);
}
