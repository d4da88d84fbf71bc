//! Port Interfaces
//!
//! Contracts between the ingest core and the backing time-series store.
//! Retry, durability, and indexing live behind the port; the core only
//! dispatches a row per event and logs failures.

use async_trait::async_trait;

use crate::domain::bucket::TimeBucketKey;
use crate::domain::record::ColumnarRecord;

/// Errors surfaced by a record writer.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The store rejected or failed the write.
    #[error("store write failed: {0}")]
    Store(String),

    /// Row serialization failed.
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying I/O failure.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound port for appending columnar rows to the time-bucketed store.
///
/// `append` selects between appending a new row at the bucket (trades,
/// quotes) and replacing the bucket's latest value (bars). The writer owns
/// its own blocking and timeout policy; callers place no timeout around the
/// dispatch.
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// Write one record at the given bucket key.
    async fn write_record(
        &self,
        key: &TimeBucketKey,
        record: ColumnarRecord,
        append: bool,
    ) -> Result<(), WriteError>;
}
