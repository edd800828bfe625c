//! Alert rules, per-key cooldowns and alert history.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use brew_core::config::span_from_secs;
use brew_core::errors::{BrewError, BrewResult, ConfigError, EntityKind};
use brew_core::models::{Alert, AlertRule, AlertSeverity, Comparison, MetricKind, ModelKey};

use crate::aggregate::aggregate;
use crate::window::SampleWindow;

/// Error rate, response time and click-through collapse.
pub fn default_rules(cooldown_secs: u64) -> Vec<AlertRule> {
    vec![
        AlertRule {
            id: "high-error-rate".to_string(),
            metric: MetricKind::ErrorRate,
            operator: Comparison::Gt,
            threshold: 0.05,
            window_secs: 300,
            min_samples: 20,
            cooldown_secs,
            severity: AlertSeverity::Critical,
        },
        AlertRule {
            id: "slow-responses".to_string(),
            metric: MetricKind::ResponseTimeMs,
            operator: Comparison::Gt,
            threshold: 1_000.0,
            window_secs: 300,
            min_samples: 20,
            cooldown_secs,
            severity: AlertSeverity::Warning,
        },
        AlertRule {
            id: "ctr-collapse".to_string(),
            metric: MetricKind::ClickThroughRate,
            operator: Comparison::Lt,
            threshold: 0.01,
            window_secs: 3_600,
            min_samples: 50,
            cooldown_secs,
            severity: AlertSeverity::Warning,
        },
    ]
}

#[derive(Debug, Default)]
pub struct AlertBook {
    rules: BTreeMap<String, AlertRule>,
    last_fired: HashMap<(String, ModelKey), DateTime<Utc>>,
    history: Vec<Alert>,
}

impl AlertBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<AlertRule>) -> Self {
        let mut book = Self::new();
        for rule in rules {
            book.rules.insert(rule.id.clone(), rule);
        }
        book
    }

    /// Insert or replace by id. Returns true when a rule was replaced.
    pub fn add_rule(&mut self, rule: AlertRule) -> BrewResult<bool> {
        if rule.id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "id".to_string(),
            }
            .into());
        }
        if !rule.threshold.is_finite() {
            return Err(ConfigError::ValidationFailed {
                field: "threshold".to_string(),
                message: format!("rule {} has a non-finite threshold", rule.id),
            }
            .into());
        }
        if rule.window_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "windowSecs".to_string(),
                message: format!("rule {} needs a window of at least one second", rule.id),
            }
            .into());
        }
        Ok(self.rules.insert(rule.id.clone(), rule).is_some())
    }

    pub fn remove_rule(&mut self, id: &str) -> BrewResult<AlertRule> {
        let rule = self
            .rules
            .remove(id)
            .ok_or_else(|| BrewError::not_found(EntityKind::AlertRule, id))?;
        self.last_fired.retain(|(rule_id, _), _| rule_id != id);
        Ok(rule)
    }

    /// Sorted by id.
    pub fn rules(&self) -> Vec<AlertRule> {
        self.rules.values().cloned().collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate every rule for `key`. Triggered rules outside their cooldown
    /// are returned and appended to the history.
    pub fn evaluate(
        &mut self,
        key: &ModelKey,
        window: &SampleWindow,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let mut fired = Vec::new();
        for rule in self.rules.values() {
            let since = now - span_from_secs(rule.window_secs);
            let recent: Vec<_> = window.since(since).collect();
            if recent.len() < rule.min_samples.max(1) {
                continue;
            }
            let observed = aggregate(recent).metric(rule.metric);
            if !rule.operator.holds(observed, rule.threshold) {
                continue;
            }
            let slot = (rule.id.clone(), key.clone());
            let cooling = self
                .last_fired
                .get(&slot)
                .is_some_and(|last| now - *last < span_from_secs(rule.cooldown_secs));
            if cooling {
                continue;
            }
            self.last_fired.insert(slot, now);
            fired.push(Alert {
                rule_id: rule.id.clone(),
                model_version: key.model_version.clone(),
                algorithm: key.algorithm,
                metric: rule.metric,
                observed,
                threshold: rule.threshold,
                severity: rule.severity,
                message: format!(
                    "{} {} on {key}: {observed:.4} {} {}",
                    rule.id,
                    rule.metric,
                    rule.operator.symbol(),
                    rule.threshold
                ),
                triggered_at: now,
            });
        }
        self.history.extend(fired.iter().cloned());
        fired
    }

    pub fn history(&self) -> &[Alert] {
        &self.history
    }

    pub fn counts_by_severity(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for alert in &self.history {
            let name = match alert.severity {
                AlertSeverity::Info => "info",
                AlertSeverity::Warning => "warning",
                AlertSeverity::Critical => "critical",
            };
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Drop alerts triggered before `cutoff`.
    pub fn purge_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.history.len();
        self.history.retain(|alert| alert.triggered_at >= cutoff);
        self.last_fired.retain(|_, fired| *fired >= cutoff);
        before - self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use brew_core::models::{Algorithm, PerformanceSample};

    fn key() -> ModelKey {
        ModelKey::new("v1", Algorithm::Hybrid)
    }

    fn window_with_errors(now: DateTime<Utc>, total: usize, errored: usize) -> SampleWindow {
        let mut window = SampleWindow::new(1_000);
        for i in 0..total {
            window.push(PerformanceSample {
                timestamp: now - Duration::seconds(i as i64),
                model_version: "v1".into(),
                algorithm: Algorithm::Hybrid,
                response_time_ms: 20.0,
                clicked: true,
                converted: false,
                rating: None,
                errored: i < errored,
            });
        }
        window
    }

    #[test]
    fn fires_once_per_cooldown() {
        let now = Utc::now();
        let mut book = AlertBook::with_rules(default_rules(300));
        let window = window_with_errors(now, 30, 10);

        let first = book.evaluate(&key(), &window, now);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].rule_id, "high-error-rate");
        assert_eq!(first[0].severity, AlertSeverity::Critical);

        assert!(book.evaluate(&key(), &window, now + Duration::seconds(60)).is_empty());
        let later = window_with_errors(now + Duration::seconds(400), 30, 10);
        assert_eq!(book.evaluate(&key(), &later, now + Duration::seconds(400)).len(), 1);
        assert_eq!(book.history().len(), 2);
        assert_eq!(book.counts_by_severity()["critical"], 2);
    }

    #[test]
    fn min_samples_gate() {
        let now = Utc::now();
        let mut book = AlertBook::with_rules(default_rules(300));
        let window = window_with_errors(now, 10, 10);
        assert!(book.evaluate(&key(), &window, now).is_empty());
    }

    #[test]
    fn rule_management() {
        let mut book = AlertBook::with_rules(default_rules(60));
        assert_eq!(book.rule_count(), 3);
        let mut rule = book.rules()[0].clone();
        rule.threshold = 0.5;
        assert!(book.add_rule(rule.clone()).unwrap());
        rule.id = String::new();
        assert!(book.add_rule(rule).is_err());

        let removed = book.remove_rule("slow-responses").unwrap();
        assert_eq!(removed.metric, MetricKind::ResponseTimeMs);
        assert_eq!(book.remove_rule("slow-responses").unwrap_err().error_code(), "NOT_FOUND");
        let ids: Vec<_> = book.rules().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["ctr-collapse", "high-error-rate"]);
    }

    #[test]
    fn purge_drops_old_history() {
        let now = Utc::now();
        let mut book = AlertBook::with_rules(default_rules(0));
        book.evaluate(&key(), &window_with_errors(now, 30, 10), now);
        assert_eq!(book.purge_before(now + Duration::seconds(1)), 1);
        assert!(book.history().is_empty());
    }
}
