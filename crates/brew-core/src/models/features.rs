use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::AttributeFamily;
use super::interaction::{InteractionType, TimeOfDay};
use crate::constants::{FEATURE_SCHEMA_VERSION, NEUTRAL_SOCIAL_SCORE};

/// Derived, cached summary of one user's behavior and tastes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeatureSnapshot {
    pub user_id: String,
    pub behavioral: BehavioralFeatures,
    pub preference: PreferenceFeatures,
    pub engagement: EngagementFeatures,
    pub temporal: TemporalFeatures,
    pub diversity: DiversityFeatures,
    pub social: SocialFeatures,
    pub last_updated: DateTime<Utc>,
    pub schema_version: u32,
    /// Recompute counter for this user.
    pub version: u64,
    pub event_count: usize,
    /// True when built without any events.
    pub is_default: bool,
}

impl UserFeatureSnapshot {
    /// The snapshot served to users without history: all rates 0, a uniform
    /// seasonal split and neutral social scores.
    pub fn default_for(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            behavioral: BehavioralFeatures::default(),
            preference: PreferenceFeatures::default(),
            engagement: EngagementFeatures::default(),
            temporal: TemporalFeatures {
                seasonal_weights: Season::ALL.iter().map(|s| (*s, 0.25)).collect(),
                trend_tags: Vec::new(),
                days_since_last_activity: None,
            },
            diversity: DiversityFeatures::default(),
            social: SocialFeatures::default(),
            last_updated: now,
            schema_version: FEATURE_SCHEMA_VERSION,
            version: 0,
            event_count: 0,
            is_default: true,
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_updated >= ttl
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralFeatures {
    pub total_interactions: usize,
    pub interaction_counts: BTreeMap<InteractionType, usize>,
    /// Interactions per day since the earliest event in the window.
    pub interaction_frequency: f64,
    pub session_count: usize,
    pub avg_session_length_minutes: f64,
    pub avg_events_per_session: f64,
    pub time_of_day_distribution: BTreeMap<TimeOfDay, f64>,
    pub day_of_week_distribution: BTreeMap<String, f64>,
    pub preferred_time_of_day: Option<TimeOfDay>,
    pub preferred_day_of_week: Option<String>,
}

/// An attribute value with its normalized preference share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedAttribute {
    pub value: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceFeatures {
    pub preferred_roast_levels: Vec<WeightedAttribute>,
    pub preferred_origins: Vec<WeightedAttribute>,
    pub preferred_processing_methods: Vec<WeightedAttribute>,
    pub preferred_flavor_notes: Vec<WeightedAttribute>,
}

impl PreferenceFeatures {
    pub fn family(&self, family: AttributeFamily) -> &[WeightedAttribute] {
        match family {
            AttributeFamily::RoastLevel => &self.preferred_roast_levels,
            AttributeFamily::Origin => &self.preferred_origins,
            AttributeFamily::ProcessingMethod => &self.preferred_processing_methods,
            AttributeFamily::FlavorNote => &self.preferred_flavor_notes,
        }
    }

    pub fn family_mut(&mut self, family: AttributeFamily) -> &mut Vec<WeightedAttribute> {
        match family {
            AttributeFamily::RoastLevel => &mut self.preferred_roast_levels,
            AttributeFamily::Origin => &mut self.preferred_origins,
            AttributeFamily::ProcessingMethod => &mut self.preferred_processing_methods,
            AttributeFamily::FlavorNote => &mut self.preferred_flavor_notes,
        }
    }

    /// Preference share of `value` in `family`, 0 when absent.
    pub fn affinity(&self, family: AttributeFamily, value: &str) -> f64 {
        self.family(family)
            .iter()
            .find(|a| a.value == value)
            .map_or(0.0, |a| a.score)
    }

    pub fn is_empty(&self) -> bool {
        AttributeFamily::ALL.iter().all(|f| self.family(*f).is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementFeatures {
    /// Mean rating value, 0 when the user has not rated.
    pub average_rating: f64,
    /// Population variance of rating values.
    pub rating_variance: f64,
    pub rating_count: usize,
    pub purchase_rate: f64,
    pub favorite_rate: f64,
    pub engagement_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Self::Winter, Self::Spring, Self::Summer, Self::Autumn];

    /// Meteorological seasons, northern hemisphere.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendTag {
    IncreasingActivity,
    DecreasingActivity,
    WeekendFocused,
    MorningRoutine,
    EveningRoutine,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalFeatures {
    pub seasonal_weights: BTreeMap<Season, f64>,
    pub trend_tags: Vec<TrendTag>,
    pub days_since_last_activity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityFeatures {
    pub unique_item_ratio: f64,
    pub exploration_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialFeatures {
    pub influence_score: f64,
    pub susceptibility_score: f64,
    pub connection_count: usize,
}

impl Default for SocialFeatures {
    fn default() -> Self {
        Self {
            influence_score: NEUTRAL_SOCIAL_SCORE,
            susceptibility_score: NEUTRAL_SOCIAL_SCORE,
            connection_count: 0,
        }
    }
}
