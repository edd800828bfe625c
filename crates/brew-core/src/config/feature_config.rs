use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::InteractionType;

/// Feature engineering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Snapshot time-to-live in the feature cache (seconds).
    pub cache_ttl_secs: u64,
    /// Maximum cached snapshots.
    pub cache_max_entries: u64,
    /// Interval between background cache sweeps (seconds).
    pub sweep_interval_secs: u64,
    /// Most recent events loaded per extraction.
    pub max_events_window: usize,
    /// Inactivity gap that splits sessions (minutes).
    pub session_gap_minutes: i64,
    /// Entries kept per preference family.
    pub preference_top_n: usize,
    /// Exponential decay rate applied per event rank.
    pub recency_decay_rate: f64,
    /// Users per chunk in batch extraction.
    pub batch_chunk_size: usize,
    /// Worker threads used by batch extraction.
    pub worker_threads: usize,
    /// Per-interaction-type preference weights.
    pub interaction_weights: InteractionWeights,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: defaults::DEFAULT_FEATURE_CACHE_TTL_SECS,
            cache_max_entries: defaults::DEFAULT_FEATURE_CACHE_MAX_ENTRIES,
            sweep_interval_secs: defaults::DEFAULT_FEATURE_SWEEP_INTERVAL_SECS,
            max_events_window: defaults::DEFAULT_MAX_EVENTS_WINDOW,
            session_gap_minutes: defaults::DEFAULT_SESSION_GAP_MINUTES,
            preference_top_n: defaults::DEFAULT_PREFERENCE_TOP_N,
            recency_decay_rate: defaults::DEFAULT_RECENCY_DECAY_RATE,
            batch_chunk_size: defaults::DEFAULT_FEATURE_BATCH_CHUNK_SIZE,
            worker_threads: defaults::DEFAULT_FEATURE_WORKER_THREADS,
            interaction_weights: InteractionWeights::default(),
        }
    }
}

/// Weight of each interaction type when accumulating preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionWeights {
    pub view: f64,
    pub click: f64,
    pub search: f64,
    pub favorite: f64,
    pub purchase: f64,
    pub rating: f64,
    pub share: f64,
    pub review: f64,
}

impl InteractionWeights {
    pub fn weight(&self, interaction_type: InteractionType) -> f64 {
        match interaction_type {
            InteractionType::View => self.view,
            InteractionType::Click => self.click,
            InteractionType::Search => self.search,
            InteractionType::Favorite => self.favorite,
            InteractionType::Purchase => self.purchase,
            InteractionType::Rating => self.rating,
            InteractionType::Share => self.share,
            InteractionType::Review => self.review,
        }
    }

    /// Largest configured weight, used to normalize implicit feedback.
    pub fn max_weight(&self) -> f64 {
        InteractionType::ALL
            .iter()
            .map(|t| self.weight(*t))
            .fold(0.0, f64::max)
    }
}

impl Default for InteractionWeights {
    fn default() -> Self {
        Self {
            view: defaults::WEIGHT_VIEW,
            click: defaults::WEIGHT_CLICK,
            search: defaults::WEIGHT_SEARCH,
            favorite: defaults::WEIGHT_FAVORITE,
            purchase: defaults::WEIGHT_PURCHASE,
            rating: defaults::WEIGHT_RATING,
            share: defaults::WEIGHT_SHARE,
            review: defaults::WEIGHT_REVIEW,
        }
    }
}
