use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::{MetricKind, ModelKey};
use super::recommendation::Algorithm;

pub const METHOD_STATISTICAL: &str = "statistical_comparison";
pub const METHOD_INSUFFICIENT_DATA: &str = "insufficient_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftType {
    None,
    Performance,
    Data,
    Concept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftRecommendation {
    Retrain,
    AdjustParameters,
    Investigate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftSignals {
    pub performance: f64,
    pub data: f64,
    pub concept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftResult {
    pub model_version: String,
    pub algorithm: Algorithm,
    pub is_drift_detected: bool,
    pub drift_type: DriftType,
    pub drift_score: f64,
    pub detection_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<DriftRecommendation>,
    pub signals: DriftSignals,
    /// Relative change of each metric against the baseline.
    pub metric_changes: BTreeMap<MetricKind, f64>,
    pub sample_count: usize,
    pub detected_at: DateTime<Utc>,
}

impl DriftResult {
    /// "Can't tell yet": too few samples or no baseline.
    pub fn insufficient_data(key: &ModelKey, sample_count: usize, now: DateTime<Utc>) -> Self {
        Self {
            model_version: key.model_version.clone(),
            algorithm: key.algorithm,
            is_drift_detected: false,
            drift_type: DriftType::None,
            drift_score: 0.0,
            detection_method: METHOD_INSUFFICIENT_DATA.to_string(),
            recommendation: None,
            signals: DriftSignals::default(),
            metric_changes: BTreeMap::new(),
            sample_count,
            detected_at: now,
        }
    }
}
