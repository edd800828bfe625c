//! Channel-backed metrics sink. Recommendation requests hand samples to an
//! unbounded channel; a background task feeds them to monitoring.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use brew_core::models::PerformanceSample;
use brew_core::traits::IMetricsSink;
use brew_monitoring::MonitoringEngine;

pub type MetricsReceiver = mpsc::UnboundedReceiver<PerformanceSample>;

#[derive(Debug, Clone)]
pub struct AsyncMetricsSink {
    tx: mpsc::UnboundedSender<PerformanceSample>,
}

impl AsyncMetricsSink {
    /// Samples submitted before a receiver is drained stay buffered.
    pub fn channel() -> (Self, MetricsReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl IMetricsSink for AsyncMetricsSink {
    fn submit(&self, sample: PerformanceSample) {
        if self.tx.send(sample).is_err() {
            tracing::debug!(event = "metrics_channel_closed");
        }
    }
}

/// Feed samples to monitoring until shutdown, then flush what is queued.
pub async fn drain(
    mut rx: MetricsReceiver,
    monitoring: Arc<MonitoringEngine>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(sample) => monitoring.submit(sample),
                None => break,
            },
            _ = shutdown.changed() => {
                rx.close();
                let mut flushed = 0usize;
                while let Ok(sample) = rx.try_recv() {
                    monitoring.submit(sample);
                    flushed += 1;
                }
                tracing::debug!(event = "metrics_drain_stopped", flushed);
                break;
            }
        }
    }
}
