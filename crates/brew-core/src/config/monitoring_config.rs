use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{defaults, span_secs};

/// Monitoring and drift detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Samples retained per (model version, algorithm) key.
    pub window_size: usize,
    pub min_baseline_samples: usize,
    pub min_drift_samples: usize,
    pub thresholds: DriftThresholds,
    /// Default cooldown for alert rules (seconds).
    pub alert_cooldown_secs: u64,
    /// Age after which persisted samples and alert history are purged (days).
    pub retention_days: i64,
    pub drift_check_interval_secs: u64,
    pub retention_interval_secs: u64,
    /// Probes answering within this many ms are healthy.
    pub healthy_response_ms: u64,
    /// Probes answering within this many ms are degraded; slower is critical.
    pub degraded_response_ms: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            window_size: defaults::DEFAULT_METRICS_WINDOW_SIZE,
            min_baseline_samples: defaults::DEFAULT_MIN_BASELINE_SAMPLES,
            min_drift_samples: defaults::DEFAULT_MIN_DRIFT_SAMPLES,
            thresholds: DriftThresholds::default(),
            alert_cooldown_secs: defaults::DEFAULT_ALERT_COOLDOWN_SECS,
            retention_days: defaults::DEFAULT_RETENTION_DAYS,
            drift_check_interval_secs: defaults::DEFAULT_DRIFT_CHECK_INTERVAL_SECS,
            retention_interval_secs: defaults::DEFAULT_RETENTION_INTERVAL_SECS,
            healthy_response_ms: defaults::DEFAULT_HEALTHY_RESPONSE_MS,
            degraded_response_ms: defaults::DEFAULT_DEGRADED_RESPONSE_MS,
        }
    }
}

impl MonitoringConfig {
    /// Retention as a duration, clamped to the longest supported span.
    pub fn retention(&self) -> Duration {
        span_secs(self.retention_days.saturating_mul(86_400))
    }
}

/// Relative-change thresholds used by drift scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftThresholds {
    pub click_through_rate: f64,
    pub conversion_rate: f64,
    pub mean_rating: f64,
    pub response_time: f64,
    pub error_rate: f64,
    /// Behavioral-metric change that counts as concept drift.
    pub concept: f64,
    /// Overall score above which drift is declared.
    pub declaration: f64,
    /// Performance drift above which retraining is recommended.
    pub retrain: f64,
    /// Population stability index at which data drift is flagged.
    pub psi: f64,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            click_through_rate: defaults::DEFAULT_CTR_DRIFT_THRESHOLD,
            conversion_rate: defaults::DEFAULT_CONVERSION_DRIFT_THRESHOLD,
            mean_rating: defaults::DEFAULT_RATING_DRIFT_THRESHOLD,
            response_time: defaults::DEFAULT_RESPONSE_TIME_DRIFT_THRESHOLD,
            error_rate: defaults::DEFAULT_ERROR_RATE_DRIFT_THRESHOLD,
            concept: defaults::DEFAULT_CONCEPT_DRIFT_THRESHOLD,
            declaration: defaults::DEFAULT_DRIFT_DECLARATION_THRESHOLD,
            retrain: defaults::DEFAULT_RETRAIN_THRESHOLD,
            psi: defaults::DEFAULT_PSI_THRESHOLD,
        }
    }
}
