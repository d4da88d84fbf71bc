#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access
    )
)]

//! Polygon Ingest - Market Data to Time-Bucketed Columnar Store
//!
//! Consumes Polygon's real-time feed (minute aggregates, trades, quotes) and
//! converts each event into a fixed-schema columnar row appended into a
//! time-bucketed store.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: The transformation core
//!   - `bucket`: minute bucketing and time-bucket keys
//!   - `symbol`: ticker normalization
//!   - `conditions`: trade suppression rules
//!   - `record`: fixed-schema columnar rows
//!   - `backfill`: concurrent first-seen tracking
//!
//! - **Application**: Port definitions
//!   - `ports`: the `RecordWriter` contract to the backing store
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `polygon`: WebSocket client, wire parsing, ingest handlers
//!   - `store`: JSONL bucket-file writer
//!   - `config`: environment-driven settings
//!   - `metrics`/`telemetry`: Prometheus and tracing setup
//!
//! # Data Flow
//!
//! ```text
//! Polygon WS ──► dispatch ──► filter ──► normalize ──► bucket ──► record ──► store
//!                               │
//!                               └──► (bars) backfill first-seen tracker
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Pure transformation logic with no I/O.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::backfill::BackfillTracker;
pub use domain::bucket::{NANOS_PER_MINUTE, RecordKind, TIMEFRAME, TimeBucketKey, minute_bucket};
pub use domain::conditions::{CONDITION_EXCHANGE_SUMMARY, is_exchange_summary};
pub use domain::record::ColumnarRecord;
pub use domain::symbol::canonical;

// Application ports
pub use application::ports::{RecordWriter, WriteError};

// Infrastructure config
pub use infrastructure::config::{ApiKey, Cluster, ConfigError, IngestConfig};

// Feed client and handlers (for integration tests)
pub use infrastructure::polygon::{
    ClientConfig, ClientError, FeedEvent, IngestHandlers, PolygonClient,
};

// Store adapter
pub use infrastructure::store::JsonlStore;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
