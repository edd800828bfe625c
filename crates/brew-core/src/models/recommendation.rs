use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interaction::TimeOfDay;
use crate::errors::ConfigError;

/// Scoring algorithm used to rank candidates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Collaborative,
    ContentBased,
    #[default]
    Hybrid,
    Popularity,
    Discovery,
    Social,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Self::Collaborative,
        Self::ContentBased,
        Self::Hybrid,
        Self::Popularity,
        Self::Discovery,
        Self::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collaborative => "collaborative",
            Self::ContentBased => "content-based",
            Self::Hybrid => "hybrid",
            Self::Popularity => "popularity",
            Self::Discovery => "discovery",
            Self::Social => "social",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == needle)
            .ok_or_else(|| ConfigError::UnknownAlgorithm {
                name: s.to_string(),
            })
    }
}

/// Request-time context used as score modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationContext {
    pub time_of_day: Option<TimeOfDay>,
    pub day_of_week: Option<String>,
    pub device_type: Option<String>,
    /// Country name, compared with the item's origin country.
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationRequest {
    pub limit: Option<usize>,
    /// Resolved through the model registry when absent.
    pub algorithm: Option<Algorithm>,
    pub exclude_item_ids: Vec<String>,
    pub include_reasons: bool,
    pub context: RecommendationContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub item_id: String,
    pub name: String,
    pub score: f64,
    /// 1-based position in the response.
    pub rank: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Which experiment arm served a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantAssignment {
    pub test_id: String,
    pub variant_index: usize,
    pub model_version: String,
    pub algorithm: Algorithm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    /// Quoted back in [`RecommendationFeedback`] to report what the user did.
    pub request_id: String,
    pub user_id: String,
    pub items: Vec<RankedItem>,
    /// Algorithm actually used, after cold-start and social fallbacks.
    pub algorithm: Algorithm,
    pub model_version: String,
    pub cold_start: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ab_test: Option<VariantAssignment>,
    pub generated_at: DateTime<Utc>,
}

/// What the user did with a served response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationFeedback {
    pub clicked: bool,
    pub converted: bool,
    pub rating: Option<f64>,
}
