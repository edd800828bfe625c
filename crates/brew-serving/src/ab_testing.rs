//! A/B tests over model versions of one model name.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::info;

use brew_core::constants::TRAFFIC_SHARE_TOLERANCE;
use brew_core::errors::{BrewError, BrewResult, ConfigError, EntityKind};
use brew_core::models::{AbTest, AbVariant, VariantAssignment, VariantMetrics, VariantOutcome};

use crate::assignment;

#[derive(Default)]
pub struct AbTestManager {
    tests: DashMap<String, AbTest>,
}

impl AbTestManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test. The definition is fully validated before anything
    /// is stored.
    pub fn create(
        &self,
        test_id: &str,
        model_name: &str,
        variants: Vec<AbVariant>,
        now: DateTime<Utc>,
    ) -> BrewResult<AbTest> {
        validate_definition(test_id, model_name, &variants)?;

        let test = AbTest {
            test_id: test_id.to_string(),
            model_name: model_name.to_string(),
            metrics: vec![VariantMetrics::default(); variants.len()],
            variants,
            started_at: now,
            ended_at: None,
        };
        match self.tests.entry(test_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(ConfigError::DuplicateAbTest {
                    test_id: test_id.to_string(),
                }
                .into())
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(test.clone());
                info!(
                    event = "ab_test_created",
                    test_id,
                    model_name,
                    variants = test.variants.len()
                );
                Ok(test)
            }
        }
    }

    pub fn get(&self, test_id: &str) -> BrewResult<AbTest> {
        self.tests
            .get(test_id)
            .map(|t| t.clone())
            .ok_or_else(|| BrewError::not_found(EntityKind::AbTest, test_id))
    }

    /// Same user, same test → same variant, for as long as the test runs.
    pub fn assign(&self, test_id: &str, user_id: &str) -> BrewResult<VariantAssignment> {
        let test = self
            .tests
            .get(test_id)
            .ok_or_else(|| BrewError::not_found(EntityKind::AbTest, test_id))?;
        if !test.is_running() {
            return Err(ConfigError::ValidationFailed {
                field: "testId".to_string(),
                message: format!("ab test {test_id} has ended"),
            }
            .into());
        }
        let index = assignment::pick_variant(&test.variants, assignment::bucket(test_id, user_id));
        let variant = &test.variants[index];
        Ok(VariantAssignment {
            test_id: test_id.to_string(),
            variant_index: index,
            model_version: variant.model_version.clone(),
            algorithm: variant.algorithm,
        })
    }

    pub fn record_outcome(
        &self,
        test_id: &str,
        variant_index: usize,
        outcome: VariantOutcome,
    ) -> BrewResult<()> {
        let mut test = self
            .tests
            .get_mut(test_id)
            .ok_or_else(|| BrewError::not_found(EntityKind::AbTest, test_id))?;
        let metrics = test.metrics.get_mut(variant_index).ok_or_else(|| {
            BrewError::from(ConfigError::ValidationFailed {
                field: "variantIndex".to_string(),
                message: format!("no variant {variant_index} in ab test {test_id}"),
            })
        })?;
        match outcome {
            VariantOutcome::Request => metrics.requests += 1,
            VariantOutcome::Click => metrics.clicks += 1,
            VariantOutcome::Conversion => metrics.conversions += 1,
        }
        Ok(())
    }

    /// Stop a test. Ending twice keeps the first end time.
    pub fn end(&self, test_id: &str, now: DateTime<Utc>) -> BrewResult<AbTest> {
        let mut test = self
            .tests
            .get_mut(test_id)
            .ok_or_else(|| BrewError::not_found(EntityKind::AbTest, test_id))?;
        if test.ended_at.is_none() {
            test.ended_at = Some(now);
            info!(event = "ab_test_ended", test_id);
        }
        Ok(test.clone())
    }

    /// The most recently started running test for `model_name`.
    pub fn running_for_model(&self, model_name: &str) -> Option<AbTest> {
        self.tests
            .iter()
            .filter(|t| t.model_name == model_name && t.is_running())
            .max_by(|a, b| {
                a.started_at
                    .cmp(&b.started_at)
                    .then_with(|| b.test_id.cmp(&a.test_id))
            })
            .map(|t| t.clone())
    }

    pub fn running_count(&self) -> usize {
        self.tests.iter().filter(|t| t.is_running()).count()
    }
}

fn validate_definition(test_id: &str, model_name: &str, variants: &[AbVariant]) -> BrewResult<()> {
    if test_id.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: "testId".to_string(),
        }
        .into());
    }
    if model_name.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: "modelName".to_string(),
        }
        .into());
    }
    if variants.is_empty() {
        return Err(ConfigError::ValidationFailed {
            field: "variants".to_string(),
            message: "at least one variant is required".to_string(),
        }
        .into());
    }
    if let Some(bad) = variants
        .iter()
        .find(|v| !v.traffic_share.is_finite() || v.traffic_share < 0.0)
    {
        return Err(ConfigError::ValidationFailed {
            field: "trafficShare".to_string(),
            message: format!(
                "share {} for {} must be a non-negative number",
                bad.traffic_share, bad.model_version
            ),
        }
        .into());
    }
    let sum: f64 = variants.iter().map(|v| v.traffic_share).sum();
    if (sum - 1.0).abs() > TRAFFIC_SHARE_TOLERANCE {
        return Err(ConfigError::TrafficShareSum { sum }.into());
    }
    Ok(())
}
