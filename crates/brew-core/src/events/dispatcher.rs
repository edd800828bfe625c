//! EventDispatcher: synchronous fan-out to registered handlers.

use std::sync::Arc;

use super::handler::PipelineEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// With no handlers registered every `emit_*` is a no-op.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn PipelineEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn PipelineEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// A panicking handler is logged and skipped; later handlers still run.
    fn emit<F: Fn(&dyn PipelineEventHandler)>(&self, name: &'static str, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!(event = "handler_panicked", notification = name);
            }
        }
    }

    // ---- Ingestion ----
    pub fn emit_event_ingested(&self, event: &EventIngestedEvent) {
        self.emit("event_ingested", |h| h.on_event_ingested(event));
    }

    pub fn emit_batch_progress(&self, event: &BatchProgressEvent) {
        self.emit("batch_progress", |h| h.on_batch_progress(event));
    }

    pub fn emit_batch_complete(&self, event: &BatchCompleteEvent) {
        self.emit("batch_complete", |h| h.on_batch_complete(event));
    }

    // ---- Features ----
    pub fn emit_features_computed(&self, event: &FeaturesComputedEvent) {
        self.emit("features_computed", |h| h.on_features_computed(event));
    }

    // ---- Monitoring ----
    pub fn emit_metric_recorded(&self, event: &MetricRecordedEvent) {
        self.emit("metric_recorded", |h| h.on_metric_recorded(event));
    }

    pub fn emit_alert_triggered(&self, event: &AlertTriggeredEvent) {
        self.emit("alert_triggered", |h| h.on_alert_triggered(event));
    }

    pub fn emit_drift_detected(&self, event: &DriftDetectedEvent) {
        self.emit("drift_detected", |h| h.on_drift_detected(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
