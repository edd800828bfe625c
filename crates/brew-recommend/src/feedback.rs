//! Served requests waiting for the caller to report clicks, conversions and
//! ratings. A sample leaves here either folded with its feedback or, once the
//! feedback window has passed, as served.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use brew_core::models::{PerformanceSample, VariantAssignment};

#[derive(Debug, Clone)]
pub(crate) struct PendingRequest {
    pub sample: PerformanceSample,
    pub assignment: Option<VariantAssignment>,
}

pub(crate) struct PendingFeedback {
    entries: DashMap<String, PendingRequest>,
    capacity: usize,
    window: Duration,
}

impl PendingFeedback {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            window,
        }
    }

    /// Hold a served request. Hands the request back when the buffer is full.
    pub fn hold(&self, request_id: String, pending: PendingRequest) -> Result<(), PendingRequest> {
        if self.entries.len() >= self.capacity {
            return Err(pending);
        }
        self.entries.insert(request_id, pending);
        Ok(())
    }

    pub fn take(&self, request_id: &str) -> Option<PendingRequest> {
        self.entries.remove(request_id).map(|(_, pending)| pending)
    }

    /// Remove every request served at or before `now - window`, oldest first.
    pub fn expire(&self, now: DateTime<Utc>) -> Vec<PendingRequest> {
        let cutoff = now - self.window;
        let expired_ids: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.sample.timestamp <= cutoff)
            .map(|entry| entry.key().clone())
            .collect();
        let mut expired: Vec<PendingRequest> = expired_ids
            .iter()
            .filter_map(|id| self.take(id))
            .collect();
        expired.sort_by_key(|pending| pending.sample.timestamp);
        expired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brew_core::models::Algorithm;
    use chrono::TimeZone;

    fn served(at: DateTime<Utc>) -> PendingRequest {
        PendingRequest {
            sample: PerformanceSample {
                timestamp: at,
                model_version: "v1".into(),
                algorithm: Algorithm::Hybrid,
                response_time_ms: 12.0,
                clicked: false,
                converted: false,
                rating: None,
                errored: false,
            },
            assignment: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn full_buffer_hands_request_back() {
        let pending = PendingFeedback::new(1, Duration::seconds(60));
        assert!(pending.hold("a".into(), served(now())).is_ok());
        assert!(pending.hold("b".into(), served(now())).is_err());
        assert_eq!(pending.len(), 1);
        assert!(pending.take("a").is_some());
        assert!(pending.take("a").is_none());
    }

    #[test]
    fn only_requests_past_the_window_expire() {
        let pending = PendingFeedback::new(10, Duration::seconds(60));
        pending.hold("late".into(), served(now() - Duration::seconds(30))).unwrap();
        pending.hold("old".into(), served(now() - Duration::seconds(90))).unwrap();
        pending.hold("older".into(), served(now() - Duration::seconds(120))).unwrap();

        let expired = pending.expire(now());
        assert_eq!(expired.len(), 2);
        assert!(expired[0].sample.timestamp < expired[1].sample.timestamp);
        assert_eq!(pending.len(), 1);
        assert!(pending.take("late").is_some());
    }
}
