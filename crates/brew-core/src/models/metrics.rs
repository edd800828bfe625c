use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::recommendation::Algorithm;

/// Rolling windows, baselines and drift checks are tracked per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelKey {
    pub model_version: String,
    pub algorithm: Algorithm,
}

impl ModelKey {
    pub fn new(model_version: impl Into<String>, algorithm: Algorithm) -> Self {
        Self {
            model_version: model_version.into(),
            algorithm,
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model_version, self.algorithm)
    }
}

/// One record per served recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    pub timestamp: DateTime<Utc>,
    pub model_version: String,
    pub algorithm: Algorithm,
    pub response_time_ms: f64,
    #[serde(default)]
    pub clicked: bool,
    #[serde(default)]
    pub converted: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub errored: bool,
}

impl PerformanceSample {
    pub fn key(&self) -> ModelKey {
        ModelKey::new(self.model_version.clone(), self.algorithm)
    }

    pub fn is_engaged(&self) -> bool {
        self.clicked || self.converted || self.rating.is_some()
    }
}

/// Fixed-edge histogram. Bin `i` holds values in `[edges[i-1], edges[i])`;
/// the first and last bins are open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn new(edges: &[f64]) -> Self {
        Self {
            edges: edges.to_vec(),
            counts: vec![0; edges.len() + 1],
        }
    }

    pub fn observe(&mut self, value: f64) {
        let bin = self.edges.partition_point(|edge| *edge <= value);
        self.counts[bin] += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Bin counts as fractions of the total; all zeros when empty.
    pub fn fractions(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|c| *c as f64 / total as f64)
            .collect()
    }
}

/// Rolling-window summary for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAggregate {
    pub sample_count: usize,
    pub click_through_rate: f64,
    pub conversion_rate: f64,
    /// 0 when no sample carries a rating.
    pub mean_rating: f64,
    pub rated_samples: usize,
    pub mean_response_time_ms: f64,
    pub error_rate: f64,
    /// Fraction of samples clicked, converted or rated.
    pub engagement_rate: f64,
    pub response_time_histogram: Histogram,
    pub rating_histogram: Histogram,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
}

impl MetricAggregate {
    pub fn metric(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::ClickThroughRate => self.click_through_rate,
            MetricKind::ConversionRate => self.conversion_rate,
            MetricKind::MeanRating => self.mean_rating,
            MetricKind::ResponseTimeMs => self.mean_response_time_ms,
            MetricKind::ErrorRate => self.error_rate,
            MetricKind::EngagementRate => self.engagement_rate,
        }
    }
}

/// Aggregate metrics alert rules and drift scoring can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ClickThroughRate,
    ConversionRate,
    MeanRating,
    ResponseTimeMs,
    ErrorRate,
    EngagementRate,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClickThroughRate => "click_through_rate",
            Self::ConversionRate => "conversion_rate",
            Self::MeanRating => "mean_rating",
            Self::ResponseTimeMs => "response_time_ms",
            Self::ErrorRate => "error_rate",
            Self::EngagementRate => "engagement_rate",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frozen aggregate used as the comparison point for drift scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub key: ModelKey,
    pub aggregate: MetricAggregate,
    pub captured_at: DateTime<Utc>,
}

/// Result of `set_baseline`. Too few samples is a steady state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BaselineOutcome {
    #[serde(rename_all = "camelCase")]
    Set {
        key: ModelKey,
        sample_count: usize,
        captured_at: DateTime<Utc>,
        replaced_previous: bool,
    },
    #[serde(rename_all = "camelCase")]
    InsufficientData {
        key: ModelKey,
        required: usize,
        available: usize,
    },
}

impl BaselineOutcome {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set { .. })
    }
}
