//! Request types accepted by the service that have no engine-level twin.

use serde::{Deserialize, Serialize};

use brew_core::models::AbVariant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTestRequest {
    pub test_id: String,
    pub model_name: String,
    pub variants: Vec<AbVariant>,
}
