//! PipelineEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Observer of pipeline notifications.
///
/// Handlers override only the events they care about. Handlers run inline on
/// the producing thread and must return quickly.
pub trait PipelineEventHandler: Send + Sync {
    // ---- Ingestion ----
    fn on_event_ingested(&self, _event: &EventIngestedEvent) {}
    fn on_batch_progress(&self, _event: &BatchProgressEvent) {}
    fn on_batch_complete(&self, _event: &BatchCompleteEvent) {}

    // ---- Features ----
    fn on_features_computed(&self, _event: &FeaturesComputedEvent) {}

    // ---- Monitoring ----
    fn on_metric_recorded(&self, _event: &MetricRecordedEvent) {}
    fn on_alert_triggered(&self, _event: &AlertTriggeredEvent) {}
    fn on_drift_detected(&self, _event: &DriftDetectedEvent) {}
}
