use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::recommendation::Algorithm;

/// Registered model version. Deploying registers metadata, nothing is trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    pub version: String,
    pub algorithm: Algorithm,
    #[serde(default)]
    pub config: serde_json::Value,
    pub deployed_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Deploy input. Empty `name`/`version` and a missing `algorithm` are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeployRequest {
    pub name: String,
    pub version: String,
    pub algorithm: Option<String>,
    pub config: serde_json::Value,
    pub replace_current_deployment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    pub descriptor: ModelDescriptor,
    /// False when the deploy was staged behind an already active version.
    pub activated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded: Option<ModelDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbVariant {
    pub model_version: String,
    pub algorithm: Algorithm,
    pub traffic_share: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMetrics {
    pub requests: u64,
    pub clicks: u64,
    pub conversions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTest {
    pub test_id: String,
    pub model_name: String,
    pub variants: Vec<AbVariant>,
    /// Parallel to `variants`.
    pub metrics: Vec<VariantMetrics>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl AbTest {
    pub fn is_running(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Outcome reported for a served variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantOutcome {
    Request,
    Click,
    Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCount {
    pub name: String,
    pub version: String,
    pub requests: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingStats {
    pub active_models: Vec<ModelDescriptor>,
    pub request_counts: Vec<RequestCount>,
    pub total_requests: u64,
    pub running_tests: usize,
}
