//! MonitoringEngine: the monitoring side-channel of the pipeline.
//!
//! Samples land in a bounded window per (model version, algorithm) key.
//! Alert rules run on every sample; baselines and drift checks run on demand
//! (or from the service's maintenance loop).

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use brew_core::config::MonitoringConfig;
use brew_core::constants::{MAX_RATING, MIN_RATING};
use brew_core::errors::{BrewError, BrewResult, ValidationError};
use brew_core::events::{
    AlertTriggeredEvent, DriftDetectedEvent, EventDispatcher, MetricRecordedEvent,
};
use brew_core::models::{
    Alert, AlertRule, Algorithm, Baseline, BaselineOutcome, DriftResult, KeyStats,
    MetricAggregate, ModelKey, MonitoringStats, PerformanceSample, SystemHealth,
};
use brew_core::traits::{IHealthProbe, IMetricsSink, IMetricsStore};

use crate::aggregate::aggregate;
use crate::alerts::{default_rules, AlertBook};
use crate::drift;
use crate::health::HealthReporter;
use crate::tracing_setup::events;
use crate::window::SampleWindow;

/// What a retention pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeSummary {
    pub alerts_removed: usize,
    pub samples_removed: usize,
}

pub struct MonitoringEngine {
    config: MonitoringConfig,
    windows: DashMap<ModelKey, SampleWindow>,
    baselines: DashMap<ModelKey, Baseline>,
    alerts: Mutex<AlertBook>,
    health: HealthReporter,
    store: Option<Arc<dyn IMetricsStore>>,
    dispatcher: EventDispatcher,
}

impl MonitoringEngine {
    /// Starts with the default alert rules and no probes.
    pub fn new(config: MonitoringConfig) -> Self {
        let alerts = AlertBook::with_rules(default_rules(config.alert_cooldown_secs));
        let health = HealthReporter::new(config.healthy_response_ms, config.degraded_response_ms);
        Self {
            config,
            windows: DashMap::new(),
            baselines: DashMap::new(),
            alerts: Mutex::new(alerts),
            health,
            store: None,
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn with_metrics_store(mut self, store: Arc<dyn IMetricsStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: EventDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn IHealthProbe>) -> Self {
        self.health.register(probe);
        self
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    fn alert_book(&self) -> BrewResult<MutexGuard<'_, AlertBook>> {
        self.alerts.lock().map_err(|_| BrewError::LockPoisoned {
            what: "alert book".to_string(),
        })
    }

    // --- recording ---

    pub fn record_performance_metrics(&self, sample: PerformanceSample) -> BrewResult<Vec<Alert>> {
        self.record_performance_metrics_at(sample, Utc::now())
    }

    /// Append a sample and evaluate alert rules for its key. Returns the
    /// alerts this sample triggered.
    pub fn record_performance_metrics_at(
        &self,
        sample: PerformanceSample,
        now: DateTime<Utc>,
    ) -> BrewResult<Vec<Alert>> {
        validate_sample(&sample)?;

        if let Some(store) = &self.store {
            if let Err(e) = store.append_samples(std::slice::from_ref(&sample)) {
                events::persistence_failed("append_samples", &e);
            }
        }

        let key = sample.key();
        let (window_size, fired) = {
            let mut window = self
                .windows
                .entry(key.clone())
                .or_insert_with(|| SampleWindow::new(self.config.window_size));
            window.push(sample);
            let fired = self.alert_book()?.evaluate(&key, &window, now);
            (window.len(), fired)
        };

        self.dispatcher.emit_metric_recorded(&MetricRecordedEvent {
            key,
            window_size,
            recorded_at: now,
        });
        for alert in &fired {
            events::alert_triggered(alert);
            self.dispatcher.emit_alert_triggered(&AlertTriggeredEvent {
                alert: alert.clone(),
            });
        }
        Ok(fired)
    }

    /// Refill windows from the metrics store, oldest first. Alert rules are
    /// not evaluated for replayed samples. Returns how many were loaded.
    pub fn load_persisted(&self, since: DateTime<Utc>) -> BrewResult<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let samples = store.samples_since(None, since)?;
        let loaded = samples.len();
        for sample in samples {
            self.windows
                .entry(sample.key())
                .or_insert_with(|| SampleWindow::new(self.config.window_size))
                .push(sample);
        }
        tracing::info!(event = "metrics_reloaded", samples = loaded);
        Ok(loaded)
    }

    // --- alert rules ---

    /// Insert or replace a rule. Returns true when an existing rule was replaced.
    pub fn add_alert_rule(&self, rule: AlertRule) -> BrewResult<bool> {
        let id = rule.id.clone();
        let replaced = self.alert_book()?.add_rule(rule)?;
        tracing::info!(event = "alert_rule_added", rule_id = %id, replaced);
        Ok(replaced)
    }

    pub fn remove_alert_rule(&self, id: &str) -> BrewResult<AlertRule> {
        let removed = self.alert_book()?.remove_rule(id)?;
        tracing::info!(event = "alert_rule_removed", rule_id = %id);
        Ok(removed)
    }

    pub fn alert_rules(&self) -> BrewResult<Vec<AlertRule>> {
        Ok(self.alert_book()?.rules())
    }

    pub fn alert_history(&self) -> BrewResult<Vec<Alert>> {
        Ok(self.alert_book()?.history().to_vec())
    }

    // --- aggregates ---

    /// `None` when nothing has been recorded for the key.
    pub fn aggregate(&self, key: &ModelKey) -> Option<MetricAggregate> {
        self.windows.get(key).map(|window| aggregate(window.iter()))
    }

    /// Current window summary; empty (all zeros) for an unknown key.
    pub fn model_metrics(&self, model_version: &str, algorithm: Algorithm) -> MetricAggregate {
        let key = ModelKey::new(model_version, algorithm);
        self.aggregate(&key)
            .unwrap_or_else(|| aggregate(std::iter::empty::<&PerformanceSample>()))
    }

    pub fn sample_count(&self, key: &ModelKey) -> usize {
        self.windows.get(key).map_or(0, |window| window.len())
    }

    pub fn baseline(&self, key: &ModelKey) -> Option<Baseline> {
        self.baselines.get(key).map(|b| b.clone())
    }

    // --- baselines & drift ---

    pub fn set_baseline(&self, model_version: &str, algorithm: Algorithm) -> BrewResult<BaselineOutcome> {
        self.set_baseline_at(model_version, algorithm, Utc::now())
    }

    /// Freeze the current window as the drift reference. Too few samples
    /// leaves any previous baseline in place.
    pub fn set_baseline_at(
        &self,
        model_version: &str,
        algorithm: Algorithm,
        now: DateTime<Utc>,
    ) -> BrewResult<BaselineOutcome> {
        require_version(model_version)?;
        let key = ModelKey::new(model_version, algorithm);
        let required = self.config.min_baseline_samples;

        let current = self
            .windows
            .get(&key)
            .filter(|window| window.len() >= required)
            .map(|window| aggregate(window.iter()));
        let Some(current) = current else {
            let available = self.sample_count(&key);
            events::baseline_insufficient(&key, required, available);
            return Ok(BaselineOutcome::InsufficientData {
                key,
                required,
                available,
            });
        };

        let sample_count = current.sample_count;
        let replaced_previous = self
            .baselines
            .insert(
                key.clone(),
                Baseline {
                    key: key.clone(),
                    aggregate: current,
                    captured_at: now,
                },
            )
            .is_some();
        events::baseline_set(&key, sample_count, replaced_previous);
        Ok(BaselineOutcome::Set {
            key,
            sample_count,
            captured_at: now,
            replaced_previous,
        })
    }

    pub fn detect_model_drift(&self, model_version: &str, algorithm: Algorithm) -> BrewResult<DriftResult> {
        self.detect_model_drift_at(model_version, algorithm, Utc::now())
    }

    /// Compare the current window against the baseline. Without a baseline
    /// or with too few samples the result is an explicit insufficient-data
    /// answer, never an error.
    pub fn detect_model_drift_at(
        &self,
        model_version: &str,
        algorithm: Algorithm,
        now: DateTime<Utc>,
    ) -> BrewResult<DriftResult> {
        require_version(model_version)?;
        Ok(self.detect_for_key(&ModelKey::new(model_version, algorithm), now))
    }

    fn detect_for_key(&self, key: &ModelKey, now: DateTime<Utc>) -> DriftResult {
        let available = self.sample_count(key);
        let baseline = self.baseline(key);
        let (Some(baseline), true) = (baseline, available >= self.config.min_drift_samples) else {
            tracing::debug!(event = "drift_insufficient_data", key = %key, samples = available);
            return DriftResult::insufficient_data(key, available, now);
        };
        let Some(current) = self.aggregate(key) else {
            return DriftResult::insufficient_data(key, 0, now);
        };

        let result = drift::evaluate(
            key,
            &baseline.aggregate,
            &current,
            &self.config.thresholds,
            now,
        );
        if result.is_drift_detected {
            events::drift_detected(&result);
            self.dispatcher.emit_drift_detected(&DriftDetectedEvent {
                result: result.clone(),
            });
        } else {
            tracing::debug!(event = "drift_checked", key = %key, score = result.drift_score);
        }
        result
    }

    /// Drift check for every key that has a baseline, ordered by key.
    pub fn detect_all_drift(&self, now: DateTime<Utc>) -> Vec<DriftResult> {
        let mut keys: Vec<ModelKey> = self.baselines.iter().map(|b| b.key().clone()).collect();
        keys.sort();
        keys.iter().map(|key| self.detect_for_key(key, now)).collect()
    }

    // --- health & stats ---

    pub fn system_health(&self) -> SystemHealth {
        self.system_health_at(Utc::now())
    }

    pub fn system_health_at(&self, now: DateTime<Utc>) -> SystemHealth {
        self.health.check(now)
    }

    pub fn monitoring_stats(&self) -> BrewResult<MonitoringStats> {
        let mut keys: Vec<KeyStats> = self
            .windows
            .iter()
            .map(|entry| KeyStats {
                key: entry.key().clone(),
                sample_count: entry.len(),
                has_baseline: self.baselines.contains_key(entry.key()),
                aggregate: aggregate(entry.iter()),
            })
            .collect();
        keys.sort_by(|a, b| a.key.cmp(&b.key));

        let book = self.alert_book()?;
        Ok(MonitoringStats {
            tracked_keys: keys.len(),
            total_samples: keys.iter().map(|k| k.sample_count).sum(),
            baselines: self.baselines.len(),
            alert_rules: book.rule_count(),
            alerts_triggered: book.history().len(),
            alerts_by_severity: book.counts_by_severity(),
            keys,
        })
    }

    // --- retention ---

    /// Drop alert history and persisted samples older than the retention period.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> BrewResult<PurgeSummary> {
        let cutoff = now - self.config.retention();
        let alerts_removed = self.alert_book()?.purge_before(cutoff);
        let samples_removed = match &self.store {
            Some(store) => store.purge_before(cutoff)?,
            None => 0,
        };
        tracing::info!(
            event = "retention_purged",
            alerts_removed,
            samples_removed,
            cutoff = %cutoff
        );
        Ok(PurgeSummary {
            alerts_removed,
            samples_removed,
        })
    }
}

impl IMetricsSink for MonitoringEngine {
    fn submit(&self, sample: PerformanceSample) {
        if let Err(e) = self.record_performance_metrics(sample) {
            tracing::warn!(event = "metric_rejected", error = %e, code = e.error_code());
        }
    }
}

fn require_version(model_version: &str) -> BrewResult<()> {
    if model_version.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "modelVersion",
        }
        .into());
    }
    Ok(())
}

fn validate_sample(sample: &PerformanceSample) -> BrewResult<()> {
    require_version(&sample.model_version)?;
    if !sample.response_time_ms.is_finite() || sample.response_time_ms < 0.0 {
        return Err(ValidationError::Rejected {
            reason: format!(
                "responseTimeMs must be a finite value >= 0, got {}",
                sample.response_time_ms
            ),
        }
        .into());
    }
    if let Some(rating) = sample.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ValidationError::RatingOutOfRange {
                value: rating,
                min: MIN_RATING,
                max: MAX_RATING,
            }
            .into());
        }
    }
    Ok(())
}
