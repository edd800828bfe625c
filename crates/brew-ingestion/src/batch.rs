//! Chunk planning and result bookkeeping for bulk ingestion.

use std::ops::Range;

use brew_core::constants::MAX_BULK_BATCH_SIZE;
use brew_core::models::{BatchItemError, BatchReport};

/// Error code for items skipped after the batch was aborted.
pub const CODE_ABORTED: &str = "BATCH_ABORTED";

/// Clamp the requested chunk size to `1..=MAX_BULK_BATCH_SIZE`.
pub fn effective_batch_size(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(1, MAX_BULK_BATCH_SIZE)
}

/// Number of chunks for `total` items.
pub fn chunk_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size.max(1))
}

/// Accumulates per-item outcomes. Every failure carries its input index, so
/// `failed == errors.len()` always holds.
#[derive(Debug, Default)]
pub struct BatchTally {
    report: BatchReport,
}

impl BatchTally {
    pub fn processed(&mut self, n: usize) {
        self.report.processed += n;
    }

    pub fn duplicate(&mut self) {
        self.report.duplicates += 1;
    }

    pub fn fail(&mut self, index: usize, code: &str, message: impl Into<String>) {
        self.report.failed += 1;
        self.report.errors.push(BatchItemError {
            index,
            code: code.to_string(),
            message: message.into(),
        });
    }

    pub fn fail_all(&mut self, indices: impl IntoIterator<Item = usize>, code: &str, message: &str) {
        for index in indices {
            self.fail(index, code, message);
        }
    }

    /// Mark every remaining input as failed and flag the batch aborted.
    pub fn abort(&mut self, remaining: Range<usize>, reason: &str) {
        self.fail_all(remaining, CODE_ABORTED, reason);
        self.report.aborted = true;
    }

    pub fn report(&self) -> &BatchReport {
        &self.report
    }

    pub fn finish(mut self) -> BatchReport {
        self.report.errors.sort_by_key(|e| e.index);
        self.report
    }
}
