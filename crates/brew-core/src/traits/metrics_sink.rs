use crate::models::PerformanceSample;

/// Destination for performance samples. `submit` must not block.
pub trait IMetricsSink: Send + Sync {
    fn submit(&self, sample: PerformanceSample);
}
