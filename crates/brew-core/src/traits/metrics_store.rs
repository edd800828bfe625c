use chrono::{DateTime, Utc};

use crate::errors::BrewResult;
use crate::models::{ModelKey, PerformanceSample};

/// Optional persistence for performance samples.
pub trait IMetricsStore: Send + Sync {
    fn append_samples(&self, samples: &[PerformanceSample]) -> BrewResult<usize>;
    /// Oldest first. `None` reads every key.
    fn samples_since(
        &self,
        key: Option<&ModelKey>,
        since: DateTime<Utc>,
    ) -> BrewResult<Vec<PerformanceSample>>;
    /// Deletes samples older than `cutoff`, returning how many were removed.
    fn purge_before(&self, cutoff: DateTime<Utc>) -> BrewResult<usize>;
}
