//! Payloads for pipeline notifications.

use chrono::{DateTime, Utc};

use crate::models::{Alert, DriftResult, InteractionType, ModelKey};

/// Payload for `on_event_ingested`.
#[derive(Debug, Clone)]
pub struct EventIngestedEvent {
    pub event_id: String,
    pub user_id: String,
    pub item_id: String,
    pub interaction_type: InteractionType,
}

/// Payload for `on_batch_progress`, once per chunk.
#[derive(Debug, Clone)]
pub struct BatchProgressEvent {
    pub chunk_index: usize,
    pub chunk_count: usize,
    pub processed: usize,
    pub failed: usize,
    pub duplicates: usize,
}

/// Payload for `on_batch_complete`, once per batch.
#[derive(Debug, Clone)]
pub struct BatchCompleteEvent {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub duplicates: usize,
    pub aborted: bool,
    pub duration_ms: u64,
}

/// Payload for `on_features_computed`.
#[derive(Debug, Clone)]
pub struct FeaturesComputedEvent {
    pub user_id: String,
    pub version: u64,
    pub event_count: usize,
    pub is_default: bool,
}

/// Payload for `on_metric_recorded`.
#[derive(Debug, Clone)]
pub struct MetricRecordedEvent {
    pub key: ModelKey,
    pub window_size: usize,
    pub recorded_at: DateTime<Utc>,
}

/// Payload for `on_alert_triggered`.
#[derive(Debug, Clone)]
pub struct AlertTriggeredEvent {
    pub alert: Alert,
}

/// Payload for `on_drift_detected`.
#[derive(Debug, Clone)]
pub struct DriftDetectedEvent {
    pub result: DriftResult,
}
