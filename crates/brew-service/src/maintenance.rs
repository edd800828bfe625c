//! Background maintenance: feature cache sweep, periodic drift checks,
//! expiry of unanswered feedback, retention cleanup and (with channel
//! delivery) the metrics drain. Each runs on its own tokio interval until
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use brew_core::constants::MAX_SPAN_SECS;
use brew_core::errors::BrewResult;

use crate::service::PersonalizationService;
use crate::sink;

pub struct Maintenance {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Maintenance {
    /// Spawn the maintenance tasks. Must be called from within a Tokio runtime.
    pub fn start(service: Arc<PersonalizationService>) -> BrewResult<Self> {
        let (shutdown, rx) = watch::channel(false);
        let config = service.config().clone();
        let mut tasks = Vec::new();

        if let Some(metrics) = service.take_metrics_receiver()? {
            tasks.push(tokio::spawn(sink::drain(
                metrics,
                service.monitoring().clone(),
                rx.clone(),
            )));
        }

        let svc = service.clone();
        tasks.push(spawn_periodic(
            "feature_sweep",
            config.features.sweep_interval_secs,
            rx.clone(),
            move || {
                let evicted = svc.sweep_features(Utc::now());
                tracing::debug!(event = "feature_cache_swept", evicted);
            },
        ));

        let svc = service.clone();
        tasks.push(spawn_periodic(
            "drift_check",
            config.monitoring.drift_check_interval_secs,
            rx.clone(),
            move || {
                let drifted = svc.run_drift_checks(Utc::now());
                tracing::info!(event = "drift_check_completed", drifted);
            },
        ));

        let svc = service.clone();
        tasks.push(spawn_periodic(
            "feedback_expiry",
            config.recommendation.feedback_window_secs,
            rx.clone(),
            move || {
                let expired = svc.flush_expired_feedback(Utc::now());
                tracing::debug!(event = "feedback_expired", expired);
            },
        ));

        let svc = service;
        tasks.push(spawn_periodic(
            "retention",
            config.monitoring.retention_interval_secs,
            rx,
            move || {
                if let Err(e) = svc.purge_expired(Utc::now()) {
                    tracing::warn!(event = "retention_failed", error = %e);
                }
            },
        ));

        tracing::info!(event = "maintenance_started", tasks = tasks.len());
        Ok(Self { shutdown, tasks })
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Signal every task and wait for them to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(event = "maintenance_task_failed", error = %e);
            }
        }
        tracing::info!(event = "maintenance_stopped");
    }
}

/// Run `job` every `period_secs`, clamped to at least one second. The first tick fires
/// immediately. Delayed ticks are not bunched up.
fn spawn_periodic<F>(
    name: &'static str,
    period_secs: u64,
    mut shutdown: watch::Receiver<bool>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + 'static,
{
    tokio::spawn(async move {
        let period = period_secs.clamp(1, MAX_SPAN_SECS.unsigned_abs());
        let mut timer = interval(Duration::from_secs(period));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = timer.tick() => job(),
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!(event = "maintenance_task_stopped", task = name);
    })
}
