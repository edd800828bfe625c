//! Configuration for the personalization pipeline.
//! TOML-based, resolved as: env (`BREW_*`) > file > compiled defaults.

pub mod defaults;
pub mod feature_config;
pub mod ingestion_config;
pub mod monitoring_config;
pub mod observability_config;
pub mod recommendation_config;
pub mod storage_config;

use std::path::Path;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub use feature_config::{FeatureConfig, InteractionWeights};
pub use ingestion_config::IngestionConfig;
pub use monitoring_config::{DriftThresholds, MonitoringConfig};
pub use observability_config::ObservabilityConfig;
pub use recommendation_config::{HybridWeights, RecommendationConfig};
pub use storage_config::StorageConfig;

use crate::constants::{MAX_BULK_BATCH_SIZE, MAX_SPAN_SECS};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewConfig {
    pub storage: StorageConfig,
    pub ingestion: IngestionConfig,
    pub features: FeatureConfig,
    pub recommendation: RecommendationConfig,
    pub monitoring: MonitoringConfig,
    pub observability: ObservabilityConfig,
}

impl BrewConfig {
    /// Load a TOML file, apply `BREW_*` environment overrides, then validate.
    /// A missing file is not an error: compiled defaults are used instead.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string. Missing sections take defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        env_override("BREW_DB_PATH", &mut self.storage.db_path);
        env_override("BREW_READ_POOL_SIZE", &mut self.storage.read_pool_size);
        env_override("BREW_INGEST_BATCH_SIZE", &mut self.ingestion.default_batch_size);
        env_override("BREW_FEATURE_CACHE_TTL_SECS", &mut self.features.cache_ttl_secs);
        env_override("BREW_FEATURE_MAX_EVENTS", &mut self.features.max_events_window);
        env_override("BREW_RECOMMENDATION_MAX_LIMIT", &mut self.recommendation.max_limit);
        env_override(
            "BREW_FEEDBACK_WINDOW_SECS",
            &mut self.recommendation.feedback_window_secs,
        );
        env_override("BREW_METRICS_WINDOW_SIZE", &mut self.monitoring.window_size);
        env_override("BREW_RETENTION_DAYS", &mut self.monitoring.retention_days);
        env_override("BREW_LOG_LEVEL", &mut self.observability.log_level);
        env_override("BREW_JSON_LOGS", &mut self.observability.json_logs);
    }

    /// Validate value ranges across all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.read_pool_size == 0 {
            return Err(invalid("storage.read_pool_size", "must be greater than 0"));
        }
        if !(1..=MAX_BULK_BATCH_SIZE).contains(&self.ingestion.default_batch_size) {
            return Err(invalid(
                "ingestion.default_batch_size",
                &format!("must be between 1 and {MAX_BULK_BATCH_SIZE}"),
            ));
        }
        if self.ingestion.max_consecutive_chunk_failures == 0 {
            return Err(invalid(
                "ingestion.max_consecutive_chunk_failures",
                "must be greater than 0",
            ));
        }
        check_span(
            "ingestion.max_future_skew_secs",
            self.ingestion.max_future_skew_secs,
            1,
        )?;

        let f = &self.features;
        if f.cache_ttl_secs == 0 {
            return Err(invalid("features.cache_ttl_secs", "must be greater than 0"));
        }
        check_span("features.cache_ttl_secs", secs(f.cache_ttl_secs), 1)?;
        check_span("features.sweep_interval_secs", secs(f.sweep_interval_secs), 1)?;
        if f.max_events_window == 0 {
            return Err(invalid("features.max_events_window", "must be greater than 0"));
        }
        if f.session_gap_minutes <= 0 {
            return Err(invalid("features.session_gap_minutes", "must be greater than 0"));
        }
        check_span("features.session_gap_minutes", f.session_gap_minutes, 60)?;
        if f.recency_decay_rate < 0.0 || !f.recency_decay_rate.is_finite() {
            return Err(invalid("features.recency_decay_rate", "must be a finite value >= 0"));
        }
        if f.batch_chunk_size == 0 || f.worker_threads == 0 {
            return Err(invalid(
                "features.batch_chunk_size",
                "chunk size and worker threads must be greater than 0",
            ));
        }
        if f.interaction_weights.max_weight() <= 0.0 {
            return Err(invalid(
                "features.interaction_weights",
                "at least one weight must be positive",
            ));
        }

        let r = &self.recommendation;
        if r.max_limit == 0 || r.default_limit == 0 || r.default_limit > r.max_limit {
            return Err(invalid(
                "recommendation.default_limit",
                "must be between 1 and recommendation.max_limit",
            ));
        }
        let hw = &r.hybrid_weights;
        if hw.collaborative < 0.0 || hw.content < 0.0 || hw.popularity < 0.0 {
            return Err(invalid("recommendation.hybrid_weights", "weights must be >= 0"));
        }
        if hw.collaborative + hw.content + hw.popularity <= 0.0 {
            return Err(invalid("recommendation.hybrid_weights", "weights must not all be 0"));
        }
        if !(0.0..=1.0).contains(&r.discovery_novelty_weight) {
            return Err(invalid(
                "recommendation.discovery_novelty_weight",
                "must be between 0.0 and 1.0",
            ));
        }
        check_span(
            "recommendation.popularity_window_days",
            r.popularity_window_days,
            86_400,
        )?;
        if r.feedback_window_secs == 0 {
            return Err(invalid(
                "recommendation.feedback_window_secs",
                "must be greater than 0",
            ));
        }
        check_span(
            "recommendation.feedback_window_secs",
            secs(r.feedback_window_secs),
            1,
        )?;

        let m = &self.monitoring;
        if m.window_size < m.min_drift_samples.max(m.min_baseline_samples) {
            return Err(invalid(
                "monitoring.window_size",
                "must hold at least min_drift_samples and min_baseline_samples",
            ));
        }
        if m.healthy_response_ms > m.degraded_response_ms {
            return Err(invalid(
                "monitoring.healthy_response_ms",
                "must not exceed monitoring.degraded_response_ms",
            ));
        }
        if m.retention_days <= 0 {
            return Err(invalid("monitoring.retention_days", "must be greater than 0"));
        }
        check_span("monitoring.retention_days", m.retention_days, 86_400)?;
        check_span("monitoring.alert_cooldown_secs", secs(m.alert_cooldown_secs), 1)?;
        check_span(
            "monitoring.drift_check_interval_secs",
            secs(m.drift_check_interval_secs),
            1,
        )?;
        check_span(
            "monitoring.retention_interval_secs",
            secs(m.retention_interval_secs),
            1,
        )?;

        match self.observability.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(invalid(
                "observability.log_level",
                &format!("unknown level '{other}'"),
            )),
        }
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// `value` in units of `unit_secs` must fit within [`MAX_SPAN_SECS`].
fn check_span(field: &str, value: i64, unit_secs: i64) -> Result<(), ConfigError> {
    let max = MAX_SPAN_SECS / unit_secs;
    if !(0..=max).contains(&value) {
        return Err(invalid(field, &format!("must be between 0 and {max}")));
    }
    Ok(())
}

fn secs(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `secs` as a duration, clamped to `0..=MAX_SPAN_SECS`.
pub fn span_secs(secs: i64) -> Duration {
    Duration::seconds(secs.clamp(0, MAX_SPAN_SECS))
}

/// Unsigned variant of [`span_secs`].
pub fn span_from_secs(secs: u64) -> Duration {
    span_secs(i64::try_from(secs).unwrap_or(MAX_SPAN_SECS))
}

/// Unparseable values are ignored and the existing value kept.
fn env_override<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(val) = std::env::var(key) {
        if let Ok(v) = val.parse::<T>() {
            *target = v;
        }
    }
}
