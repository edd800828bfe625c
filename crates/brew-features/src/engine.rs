//! FeatureEngine: cache-first snapshot extraction, forced refresh, and
//! parallel batch extraction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use brew_core::config::FeatureConfig;
use brew_core::constants::FEATURE_SCHEMA_VERSION;
use brew_core::errors::{BrewResult, ValidationError};
use brew_core::events::{EventDispatcher, FeaturesComputedEvent};
use brew_core::models::{CoffeeItem, UserFeatureSnapshot};
use brew_core::traits::{ICatalog, IEventStore, IFeatureCache, ISocialGraph};

use crate::extractors::{
    behavioral, diversity, engagement, preference, social, temporal, ExtractionInput,
};

/// A user whose snapshot could not be built during batch extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionFailure {
    pub user_id: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct BatchExtraction {
    pub snapshots: HashMap<String, Arc<UserFeatureSnapshot>>,
    pub failures: Vec<ExtractionFailure>,
}

pub struct FeatureEngine {
    store: Arc<dyn IEventStore>,
    catalog: Arc<dyn ICatalog>,
    cache: Arc<dyn IFeatureCache>,
    social: Option<Arc<dyn ISocialGraph>>,
    config: FeatureConfig,
    /// Per-user recompute counters.
    versions: DashMap<String, u64>,
    dispatcher: EventDispatcher,
    /// Falls back to the global rayon pool when a dedicated one can't be built.
    pool: Option<rayon::ThreadPool>,
}

impl FeatureEngine {
    pub fn new(
        store: Arc<dyn IEventStore>,
        catalog: Arc<dyn ICatalog>,
        cache: Arc<dyn IFeatureCache>,
        config: FeatureConfig,
    ) -> Self {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads.max(1))
            .thread_name(|i| format!("brew-features-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(err) => {
                warn!(event = "feature_pool_unavailable", error = %err);
                None
            }
        };
        Self {
            store,
            catalog,
            cache,
            social: None,
            config,
            versions: DashMap::new(),
            dispatcher: EventDispatcher::new(),
            pool,
        }
    }

    pub fn with_social_graph(mut self, graph: Arc<dyn ISocialGraph>) -> Self {
        self.social = Some(graph);
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: EventDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn cache(&self) -> &Arc<dyn IFeatureCache> {
        &self.cache
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn extract_user_features(
        &self,
        user_id: &str,
        force_refresh: bool,
    ) -> BrewResult<Arc<UserFeatureSnapshot>> {
        self.extract_user_features_at(user_id, force_refresh, Utc::now())
    }

    /// Cached snapshot when fresh, otherwise a recomputed one written back to
    /// the cache. `force_refresh` always recomputes.
    pub fn extract_user_features_at(
        &self,
        user_id: &str,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> BrewResult<Arc<UserFeatureSnapshot>> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "userId" }.into());
        }
        if !force_refresh {
            if let Some(cached) = self.cache.get(user_id, now) {
                return Ok(cached);
            }
        }

        let snapshot = Arc::new(self.compute_snapshot(user_id, now)?);
        self.cache.put(Arc::clone(&snapshot));
        self.dispatcher.emit_features_computed(&FeaturesComputedEvent {
            user_id: snapshot.user_id.clone(),
            version: snapshot.version,
            event_count: snapshot.event_count,
            is_default: snapshot.is_default,
        });
        Ok(snapshot)
    }

    /// Build a snapshot from storage, bypassing the cache.
    pub fn compute_snapshot(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> BrewResult<UserFeatureSnapshot> {
        let _span = tracing::debug_span!("compute_features", user_id).entered();

        let events = self
            .store
            .recent_events(user_id, self.config.max_events_window)?;
        let version = self.next_version(user_id);

        if events.is_empty() {
            debug!(event = "default_snapshot", user_id, version);
            return Ok(UserFeatureSnapshot {
                version,
                ..UserFeatureSnapshot::default_for(user_id, now)
            });
        }

        let mut seen = HashSet::new();
        let item_ids: Vec<String> = events
            .iter()
            .filter(|e| seen.insert(e.item_id.as_str()))
            .map(|e| e.item_id.clone())
            .collect();
        let items: HashMap<String, CoffeeItem> = self
            .catalog
            .get_items(&item_ids)?
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();

        let input = ExtractionInput {
            events: &events,
            items: &items,
            config: &self.config,
            now,
        };
        let snapshot = UserFeatureSnapshot {
            user_id: user_id.to_string(),
            behavioral: behavioral::extract(&input),
            preference: preference::extract(&input),
            engagement: engagement::extract(&input),
            temporal: temporal::extract(&input),
            diversity: diversity::extract(&input),
            social: social::extract(user_id, self.social.as_deref()),
            last_updated: now,
            schema_version: FEATURE_SCHEMA_VERSION,
            version,
            event_count: events.len(),
            is_default: false,
        };
        debug!(
            event = "features_computed",
            user_id,
            version,
            events = events.len(),
            catalog_hits = items.len()
        );
        Ok(snapshot)
    }

    pub fn invalidate(&self, user_id: &str) {
        self.cache.invalidate(user_id);
    }

    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        self.cache.sweep(now)
    }

    /// Extract many users, `batch_chunk_size` at a time on the worker pool.
    /// Order inside a chunk is not preserved; failures are per user.
    pub fn batch_extract(&self, user_ids: &[String]) -> BatchExtraction {
        let mut out = BatchExtraction::default();
        for chunk in user_ids.chunks(self.config.batch_chunk_size.max(1)) {
            let results: Vec<(String, BrewResult<Arc<UserFeatureSnapshot>>)> =
                self.run_parallel(|| {
                    chunk
                        .par_iter()
                        .map(|user_id| {
                            (user_id.clone(), self.extract_user_features(user_id, false))
                        })
                        .collect()
                });
            for (user_id, result) in results {
                match result {
                    Ok(snapshot) => {
                        out.snapshots.insert(user_id, snapshot);
                    }
                    Err(err) => {
                        warn!(
                            event = "feature_extraction_failed",
                            user_id = %user_id,
                            error = %err
                        );
                        out.failures.push(ExtractionFailure {
                            user_id,
                            code: err.error_code().to_string(),
                            message: err.to_string(),
                        });
                    }
                }
            }
        }
        out
    }

    fn run_parallel<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    fn next_version(&self, user_id: &str) -> u64 {
        let mut counter = self.versions.entry(user_id.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}
