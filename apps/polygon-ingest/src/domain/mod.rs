//! Domain layer - Pure event-to-record transformation logic.

/// Backfill first-seen tracking.
pub mod backfill;

/// Timestamp bucketing and time-bucket keys.
pub mod bucket;

/// Trade condition filtering.
pub mod conditions;

/// Columnar record schemas and builders.
pub mod record;

/// Symbol normalization.
pub mod symbol;
