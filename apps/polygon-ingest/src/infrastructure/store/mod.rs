//! JSONL Time-Bucket Store Adapter
//!
//! File-backed implementation of the record writer port: one `.jsonl` file
//! per bucket key under a data directory, one JSON row per line. Appending
//! writes add a line; non-appending writes replace the file with the single
//! latest row (overwrite semantics for bars).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{RecordWriter, WriteError};
use crate::domain::bucket::TimeBucketKey;
use crate::domain::record::ColumnarRecord;

/// JSONL-file store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    data_dir: PathBuf,
}

impl JsonlStore {
    /// Create a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        Ok(Self { data_dir })
    }

    /// File path backing a bucket key.
    ///
    /// The key's `/` separators would nest directories, so they are mapped to
    /// `_` in the file name: `AAPL/1Min/OHLCV` -> `AAPL_1Min_OHLCV.jsonl`.
    #[must_use]
    pub fn bucket_path(&self, key: &TimeBucketKey) -> PathBuf {
        let file_name = format!("{}.jsonl", key.to_string().replace('/', "_"));
        self.data_dir.join(file_name)
    }

    /// The root data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait]
impl RecordWriter for JsonlStore {
    async fn write_record(
        &self,
        key: &TimeBucketKey,
        record: ColumnarRecord,
        append: bool,
    ) -> Result<(), WriteError> {
        let mut row = serde_json::to_vec(&record)?;
        row.push(b'\n');

        let path = self.bucket_path(key);
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let mut file = options.open(&path).await?;

        file.write_all(&row).await?;
        file.flush().await?;
        Ok(())
    }
}
