//! Structured log events for monitoring operations.

use brew_core::models::{Alert, DriftResult, ModelKey};

pub fn alert_triggered(alert: &Alert) {
    tracing::warn!(
        event = "alert_triggered",
        rule_id = %alert.rule_id,
        model_version = %alert.model_version,
        algorithm = %alert.algorithm,
        metric = %alert.metric,
        observed = alert.observed,
        threshold = alert.threshold,
        severity = ?alert.severity,
        "{}",
        alert.message
    );
}

pub fn drift_detected(result: &DriftResult) {
    tracing::warn!(
        event = "drift_detected",
        model_version = %result.model_version,
        algorithm = %result.algorithm,
        drift_type = ?result.drift_type,
        drift_score = result.drift_score,
        recommendation = ?result.recommendation,
        "model drift detected"
    );
}

pub fn baseline_set(key: &ModelKey, sample_count: usize, replaced_previous: bool) {
    tracing::info!(
        event = "baseline_set",
        key = %key,
        sample_count = sample_count,
        replaced_previous = replaced_previous,
        "baseline captured"
    );
}

pub fn baseline_insufficient(key: &ModelKey, required: usize, available: usize) {
    tracing::warn!(
        event = "baseline_insufficient_data",
        key = %key,
        required = required,
        available = available,
        "not enough samples to set a baseline"
    );
}

pub fn persistence_failed(operation: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(
        event = "metrics_persistence_failed",
        operation = %operation,
        error = %error,
        "metrics store unavailable, continuing in memory"
    );
}
