//! Infrastructure layer - Adapters and external integrations.

/// Configuration from environment variables.
pub mod config;

/// Prometheus metrics.
pub mod metrics;

/// Polygon feed client, wire parsing, and ingest handlers.
pub mod polygon;

/// JSONL time-bucket store adapter.
pub mod store;

/// Tracing and OpenTelemetry setup.
pub mod telemetry;
