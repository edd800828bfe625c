//! Per-algorithm candidate scoring. Every scorer returns values in `[0, 1]`;
//! candidates without an entry score 0.

pub mod collaborative;
pub mod content;
pub mod discovery;
pub mod hybrid;
pub mod popularity;
pub mod social;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use brew_core::config::{InteractionWeights, RecommendationConfig};
use brew_core::constants::MAX_RATING;
use brew_core::errors::BrewResult;
use brew_core::models::{Algorithm, CoffeeItem, InteractionEvent, InteractionType, UserFeatureSnapshot};
use brew_core::traits::{IEventStore, ISocialGraph};

pub type ScoreMap = HashMap<String, f64>;

/// Events read per neighbor / connection lookup.
pub(crate) const PEER_EVENT_LIMIT: usize = 5_000;

pub struct ScoringInput<'a> {
    pub user_id: &'a str,
    pub snapshot: &'a UserFeatureSnapshot,
    pub candidates: &'a [CoffeeItem],
    pub store: &'a dyn IEventStore,
    pub social: Option<&'a dyn ISocialGraph>,
    pub config: &'a RecommendationConfig,
    pub weights: &'a InteractionWeights,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Scored {
    pub scores: ScoreMap,
    /// Algorithm that actually produced the scores, after fallbacks.
    pub algorithm: Algorithm,
    /// Peers (neighbors or connections) backing each item.
    pub supporters: HashMap<String, usize>,
    /// Only items with a score are eligible.
    pub scored_only: bool,
}

impl Scored {
    pub fn plain(scores: ScoreMap, algorithm: Algorithm) -> Self {
        Self {
            scores,
            algorithm,
            supporters: HashMap::new(),
            scored_only: false,
        }
    }

    pub fn get(&self, item_id: &str) -> f64 {
        self.scores.get(item_id).copied().unwrap_or(0.0)
    }

    pub fn supporters(&self, item_id: &str) -> usize {
        self.supporters.get(item_id).copied().unwrap_or(0)
    }
}

pub fn score(algorithm: Algorithm, input: &ScoringInput<'_>) -> BrewResult<Scored> {
    match algorithm {
        Algorithm::Popularity => Ok(Scored::plain(popularity::score(input)?, algorithm)),
        Algorithm::ContentBased => Ok(Scored::plain(content::score(input), algorithm)),
        Algorithm::Collaborative => collaborative::score(input),
        Algorithm::Hybrid => hybrid::score(input),
        Algorithm::Discovery => Ok(Scored::plain(discovery::score(input)?, algorithm)),
        Algorithm::Social => social::score(input),
    }
}

/// Implicit rating in `[0, 1]`: explicit ratings scaled by the max rating,
/// everything else by interaction weight relative to the heaviest one.
pub fn implicit_rating(event: &InteractionEvent, weights: &InteractionWeights) -> f64 {
    let raw = match event.interaction_type {
        InteractionType::Rating => event.value.map_or(0.0, |v| v / MAX_RATING),
        kind => {
            let max = weights.max_weight();
            if max > 0.0 {
                weights.weight(kind) / max
            } else {
                0.0
            }
        }
    };
    raw.clamp(0.0, 1.0)
}

pub(crate) fn normalize_by_max(mut scores: ScoreMap) -> ScoreMap {
    let max = scores.values().copied().fold(0.0, f64::max);
    if max > 0.0 {
        for score in scores.values_mut() {
            *score /= max;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use brew_core::models::EventMetadata;

    fn event(kind: InteractionType, value: Option<f64>) -> InteractionEvent {
        InteractionEvent {
            id: "e".into(),
            user_id: "u".into(),
            item_id: "i".into(),
            interaction_type: kind,
            value,
            timestamp: Utc::now(),
            metadata: EventMetadata::default(),
            ingested_at: Utc::now(),
        }
    }

    #[test]
    fn implicit_ratings_are_bounded() {
        let weights = InteractionWeights::default();
        assert_eq!(implicit_rating(&event(InteractionType::Rating, Some(5.0)), &weights), 1.0);
        assert_eq!(implicit_rating(&event(InteractionType::Purchase, None), &weights), 1.0);
        let view = implicit_rating(&event(InteractionType::View, None), &weights);
        assert!(view > 0.0 && view < 1.0);
    }

    #[test]
    fn normalize_scales_to_unit_max() {
        let scores: ScoreMap = [("a".to_string(), 2.0), ("b".to_string(), 1.0)].into();
        let normalized = normalize_by_max(scores);
        assert_eq!(normalized["a"], 1.0);
        assert_eq!(normalized["b"], 0.5);
        assert!(normalize_by_max(ScoreMap::new()).is_empty());
    }
}
