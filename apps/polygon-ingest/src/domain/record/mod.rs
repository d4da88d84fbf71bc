//! Columnar Records
//!
//! One row of typed columns per market-data event, schema fixed per kind.
//! The wire delivers wide numerics (f64 prices, i64 sizes); the store schema
//! narrows them to f32/i32. Narrowing follows IEEE-754 rounding for floats
//! and two's-complement wrapping for integers, matching what the store
//! actually persists; out-of-range inputs are not guarded.

use serde::Serialize;

use super::bucket::RecordKind;

/// A single-row columnar record, built fresh per event and moved into the
/// write dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnarRecord {
    /// Minute aggregate row.
    #[serde(rename_all = "PascalCase")]
    Ohlcv {
        /// Bar start, epoch seconds (source-aligned, not re-bucketed).
        epoch: i64,
        /// Opening price.
        open: f32,
        /// High price.
        high: f32,
        /// Low price.
        low: f32,
        /// Closing price.
        close: f32,
        /// Share volume.
        volume: i32,
    },
    /// Trade row.
    #[serde(rename_all = "PascalCase")]
    Trade {
        /// Minute-bucket start, epoch seconds.
        epoch: i64,
        /// Offset within the minute, nanoseconds.
        nanoseconds: i32,
        /// Trade price.
        price: f32,
        /// Trade size.
        size: i32,
    },
    /// Quote row.
    #[serde(rename_all = "PascalCase")]
    Quote {
        /// Minute-bucket start, epoch seconds.
        epoch: i64,
        /// Offset within the minute, nanoseconds.
        nanoseconds: i32,
        /// Bid price.
        bid_price: f32,
        /// Ask price.
        ask_price: f32,
        /// Bid size.
        bid_size: i32,
        /// Ask size.
        ask_size: i32,
    },
}

#[allow(clippy::cast_possible_truncation)]
impl ColumnarRecord {
    /// Build an OHLCV row from wide parsed fields.
    #[must_use]
    pub const fn ohlcv(epoch: i64, open: f64, high: f64, low: f64, close: f64, volume: i64) -> Self {
        Self::Ohlcv {
            epoch,
            open: open as f32,
            high: high as f32,
            low: low as f32,
            close: close as f32,
            volume: volume as i32,
        }
    }

    /// Build a trade row from wide parsed fields and bucket timing.
    #[must_use]
    pub const fn trade(epoch: i64, nanoseconds: i64, price: f64, size: i64) -> Self {
        Self::Trade {
            epoch,
            nanoseconds: nanoseconds as i32,
            price: price as f32,
            size: size as i32,
        }
    }

    /// Build a quote row from wide parsed fields and bucket timing.
    #[must_use]
    pub const fn quote(
        epoch: i64,
        nanoseconds: i64,
        bid_price: f64,
        ask_price: f64,
        bid_size: i64,
        ask_size: i64,
    ) -> Self {
        Self::Quote {
            epoch,
            nanoseconds: nanoseconds as i32,
            bid_price: bid_price as f32,
            ask_price: ask_price as f32,
            bid_size: bid_size as i32,
            ask_size: ask_size as i32,
        }
    }

    /// The record kind of this row.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Ohlcv { .. } => RecordKind::Ohlcv,
            Self::Trade { .. } => RecordKind::Trade,
            Self::Quote { .. } => RecordKind::Quote,
        }
    }

    /// The row's epoch column.
    #[must_use]
    pub const fn epoch(&self) -> i64 {
        match self {
            Self::Ohlcv { epoch, .. } | Self::Trade { epoch, .. } | Self::Quote { epoch, .. } => {
                *epoch
            }
        }
    }
}
