//! Feature snapshot cache.
//!
//! `moka::sync::Cache` bounds memory and drops entries past the TTL on its own
//! clock. Freshness is also checked explicitly against `last_updated`, so the
//! caller's notion of "now" decides staleness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use moka::sync::Cache;

use brew_core::config::span_from_secs;
use brew_core::models::UserFeatureSnapshot;
use brew_core::traits::IFeatureCache;

pub struct FeatureCache {
    cache: Cache<String, Arc<UserFeatureSnapshot>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FeatureCache {
    pub fn new(ttl_secs: u64, max_entries: u64) -> Self {
        let ttl = span_from_secs(ttl_secs.max(1));
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(StdDuration::from_secs(ttl.num_seconds().unsigned_abs()))
            .build();
        Self {
            cache,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Cache hit rate (0.0–1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = (self.hits() + self.misses()) as f64;
        if total == 0.0 {
            0.0
        } else {
            self.hits() as f64 / total
        }
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }
}

impl IFeatureCache for FeatureCache {
    fn get(&self, user_id: &str, now: DateTime<Utc>) -> Option<Arc<UserFeatureSnapshot>> {
        match self.cache.get(user_id) {
            Some(snapshot) if !snapshot.is_stale(now, self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(snapshot)
            }
            Some(_) => {
                self.cache.invalidate(user_id);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, snapshot: Arc<UserFeatureSnapshot>) {
        self.cache.insert(snapshot.user_id.clone(), snapshot);
    }

    fn invalidate(&self, user_id: &str) {
        self.cache.invalidate(user_id);
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(_, snapshot)| snapshot.is_stale(now, self.ttl))
            .map(|(user_id, _)| user_id)
            .collect();
        for user_id in &expired {
            self.cache.invalidate(user_id.as_str());
        }
        self.cache.run_pending_tasks();
        if !expired.is_empty() {
            tracing::debug!(event = "feature_cache_swept", evicted = expired.len());
        }
        expired.len()
    }

    fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.entry_count() as usize
    }
}
