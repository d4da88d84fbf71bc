//! Timestamp Bucketing and Time-Bucket Keys
//!
//! Every stored row is addressed by a time-bucket key combining the canonical
//! symbol, the fixed `1Min` timeframe, and the record kind. Sub-minute events
//! (trades, quotes) are floored to the start of their containing UTC minute,
//! with the remainder carried as a nanosecond offset column.

use std::fmt;

/// The fixed timeframe literal used by every bucket key.
pub const TIMEFRAME: &str = "1Min";

/// Nanoseconds in one minute; upper bound for the sub-minute offset.
pub const NANOS_PER_MINUTE: i64 = 60_000_000_000;

// =============================================================================
// Record Kind
// =============================================================================

/// Kind of columnar record stored at a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Minute aggregate (open/high/low/close/volume).
    Ohlcv,
    /// Individual trade.
    Trade,
    /// Bid/ask quote.
    Quote,
}

impl RecordKind {
    /// Get the kind literal used in bucket key text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ohlcv => "OHLCV",
            Self::Trade => "TRADE",
            Self::Quote => "QUOTE",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Time-Bucket Key
// =============================================================================

/// Identifier addressing where a record is stored.
///
/// Textual form is `"<canonicalSymbol>/1Min/<KIND>"`. Two events with equal
/// canonical symbol and kind map to the identical key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeBucketKey {
    symbol: String,
    kind: RecordKind,
}

impl TimeBucketKey {
    /// Create a key for a canonical symbol and record kind.
    #[must_use]
    pub const fn new(symbol: String, kind: RecordKind) -> Self {
        Self { symbol, kind }
    }

    /// The canonical symbol component.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The record kind component.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }
}

impl fmt::Display for TimeBucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.symbol, TIMEFRAME, self.kind)
    }
}

// =============================================================================
// Minute Bucketing
// =============================================================================

/// Floor a millisecond epoch to the start of its containing UTC minute.
///
/// Returns `(bucket_epoch_seconds, sub_minute_nanos)`. The bucket epoch is the
/// 60-second boundary at or before the instant; the offset is the instant's
/// nanosecond distance from that boundary, so `0 <= offset < 60_000_000_000`
/// holds for every input. Negative and zero epochs are valid instants.
#[must_use]
pub const fn minute_bucket(epoch_millis: i64) -> (i64, i64) {
    let bucket_epoch = epoch_millis.div_euclid(60_000) * 60;
    let offset_nanos = epoch_millis.rem_euclid(60_000) * 1_000_000;
    (bucket_epoch, offset_nanos)
}
