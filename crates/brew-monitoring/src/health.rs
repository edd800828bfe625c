//! Timed dependency probes rolled up into a [`SystemHealth`].

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use brew_core::models::{ComponentHealth, HealthStatus, SystemHealth};
use brew_core::traits::IHealthProbe;

pub struct HealthReporter {
    probes: Vec<Arc<dyn IHealthProbe>>,
    healthy_ms: f64,
    degraded_ms: f64,
}

impl HealthReporter {
    pub fn new(healthy_ms: u64, degraded_ms: u64) -> Self {
        Self {
            probes: Vec::new(),
            healthy_ms: healthy_ms as f64,
            degraded_ms: degraded_ms.max(healthy_ms) as f64,
        }
    }

    pub fn register(&mut self, probe: Arc<dyn IHealthProbe>) {
        self.probes.push(probe);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Run every probe in registration order. With no probes the system is healthy.
    pub fn check(&self, now: DateTime<Utc>) -> SystemHealth {
        let components: Vec<ComponentHealth> =
            self.probes.iter().map(|probe| self.run(probe.as_ref())).collect();
        let overall_status = derive_overall(&components);
        SystemHealth {
            overall_status,
            components,
            checked_at: now,
        }
    }

    fn run(&self, probe: &dyn IHealthProbe) -> ComponentHealth {
        let started = Instant::now();
        let outcome = probe.probe();
        let response_time_ms = started.elapsed().as_secs_f64() * 1_000.0;

        let (status, message) = match outcome {
            Ok(()) => {
                let status = self.classify(response_time_ms);
                let message = (status != HealthStatus::Healthy)
                    .then(|| format!("responded in {response_time_ms:.1}ms"));
                (status, message)
            }
            Err(e) => {
                tracing::warn!(
                    event = "health_probe_failed",
                    component = %probe.name(),
                    error = %e
                );
                (HealthStatus::Critical, Some(e.to_string()))
            }
        };

        ComponentHealth {
            name: probe.name().to_string(),
            status,
            response_time_ms,
            message,
        }
    }

    /// Status for a successful probe that took `elapsed_ms`.
    pub fn classify(&self, elapsed_ms: f64) -> HealthStatus {
        if elapsed_ms <= self.healthy_ms {
            HealthStatus::Healthy
        } else if elapsed_ms <= self.degraded_ms {
            HealthStatus::Degraded
        } else {
            HealthStatus::Critical
        }
    }
}

/// Worst component status wins.
fn derive_overall(components: &[ComponentHealth]) -> HealthStatus {
    components
        .iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(HealthStatus::Healthy)
}
