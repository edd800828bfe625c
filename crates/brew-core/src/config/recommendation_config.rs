use serde::{Deserialize, Serialize};

use super::defaults;

/// Recommendation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub default_limit: usize,
    /// Hard cap on `limit`, whatever the caller asks for.
    pub max_limit: usize,
    /// Catalog items fetched as candidates per request.
    pub candidate_pool_size: usize,
    /// Look-back window for popularity counts (days).
    pub popularity_window_days: i64,
    /// Neighbors kept for collaborative scoring.
    pub neighbor_count: usize,
    pub hybrid_weights: HybridWeights,
    /// Share of the discovery score that comes from novelty.
    pub discovery_novelty_weight: f64,
    /// Multiplier for roast levels that suit the request's time of day.
    pub context_roast_boost: f64,
    /// Multiplier for items whose origin country matches the request location.
    pub context_location_boost: f64,
    /// How long a served request waits for click/conversion feedback before
    /// its sample is recorded without it (seconds).
    pub feedback_window_secs: u64,
    /// Served requests held open for feedback at once. At 0 every sample is
    /// recorded as served.
    pub max_pending_feedback: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: defaults::DEFAULT_RECOMMENDATION_LIMIT,
            max_limit: defaults::DEFAULT_MAX_RECOMMENDATION_LIMIT,
            candidate_pool_size: defaults::DEFAULT_CANDIDATE_POOL_SIZE,
            popularity_window_days: defaults::DEFAULT_POPULARITY_WINDOW_DAYS,
            neighbor_count: defaults::DEFAULT_NEIGHBOR_COUNT,
            hybrid_weights: HybridWeights::default(),
            discovery_novelty_weight: defaults::DEFAULT_DISCOVERY_NOVELTY_WEIGHT,
            context_roast_boost: defaults::DEFAULT_CONTEXT_ROAST_BOOST,
            context_location_boost: defaults::DEFAULT_CONTEXT_LOCATION_BOOST,
            feedback_window_secs: defaults::DEFAULT_FEEDBACK_WINDOW_SECS,
            max_pending_feedback: defaults::DEFAULT_MAX_PENDING_FEEDBACK,
        }
    }
}

/// Blend weights for the hybrid algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
    pub collaborative: f64,
    pub content: f64,
    pub popularity: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            collaborative: defaults::DEFAULT_HYBRID_COLLABORATIVE_WEIGHT,
            content: defaults::DEFAULT_HYBRID_CONTENT_WEIGHT,
            popularity: defaults::DEFAULT_HYBRID_POPULARITY_WEIGHT,
        }
    }
}
