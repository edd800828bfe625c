//! Bounded per-key sample buffer. Oldest samples are evicted first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use brew_core::models::PerformanceSample;

#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<PerformanceSample>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, sample: PerformanceSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerformanceSample> {
        self.samples.iter()
    }

    /// Samples with `timestamp >= since`.
    pub fn since(&self, since: DateTime<Utc>) -> impl Iterator<Item = &PerformanceSample> {
        self.samples.iter().filter(move |s| s.timestamp >= since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brew_core::models::Algorithm;
    use chrono::Duration;

    fn sample(minutes_ago: i64) -> PerformanceSample {
        PerformanceSample {
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            model_version: "v1".into(),
            algorithm: Algorithm::Hybrid,
            response_time_ms: 10.0,
            clicked: false,
            converted: false,
            rating: None,
            errored: false,
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut window = SampleWindow::new(3);
        for m in [50, 40, 30, 20] {
            window.push(sample(m));
        }
        assert_eq!(window.len(), 3);
        let oldest = window.iter().next().unwrap().timestamp;
        assert!(Utc::now() - oldest < Duration::minutes(45));
    }

    #[test]
    fn since_filters_by_time() {
        let mut window = SampleWindow::new(10);
        for m in [50, 5, 1] {
            window.push(sample(m));
        }
        assert_eq!(window.since(Utc::now() - Duration::minutes(10)).count(), 2);
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let mut window = SampleWindow::new(0);
        window.push(sample(2));
        window.push(sample(1));
        assert_eq!(window.len(), 1);
    }
}
