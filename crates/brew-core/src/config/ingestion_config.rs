use serde::{Deserialize, Serialize};

use super::defaults;

/// Event ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Chunk size used by batch ingestion when the caller does not pass one.
    pub default_batch_size: usize,
    /// Whether batch ingestion drops already-stored events by default.
    pub skip_duplicates: bool,
    /// Tolerated clock skew before a future timestamp produces a warning (seconds).
    pub max_future_skew_secs: i64,
    /// Consecutive failed chunks after which a batch is treated as a full outage.
    pub max_consecutive_chunk_failures: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            default_batch_size: defaults::DEFAULT_INGEST_BATCH_SIZE,
            skip_duplicates: defaults::DEFAULT_SKIP_DUPLICATES,
            max_future_skew_secs: defaults::DEFAULT_MAX_FUTURE_SKEW_SECS,
            max_consecutive_chunk_failures: defaults::DEFAULT_MAX_CONSECUTIVE_CHUNK_FAILURES,
        }
    }
}
