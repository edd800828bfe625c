//! One handle over model versions, A/B tests and request counts.

use chrono::{DateTime, Utc};

use brew_core::constants::{BUILTIN_MODEL_VERSION, DEFAULT_MODEL_NAME};
use brew_core::errors::BrewResult;
use brew_core::models::{
    AbTest, AbVariant, Algorithm, DeployRequest, DeploymentResult, ModelDescriptor,
    ServingStats, VariantAssignment, VariantOutcome,
};

use crate::{AbTestManager, ModelRegistry, RequestCounter};

/// What serves a request that did not name an algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub model_name: String,
    pub model_version: String,
    pub algorithm: Algorithm,
    pub assignment: Option<VariantAssignment>,
}

#[derive(Default)]
pub struct ServingRegistry {
    models: ModelRegistry,
    ab_tests: AbTestManager,
    requests: RequestCounter,
}

impl ServingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn ab_tests(&self) -> &AbTestManager {
        &self.ab_tests
    }

    pub fn deploy_model(&self, request: DeployRequest) -> BrewResult<DeploymentResult> {
        self.models.deploy(request)
    }

    pub fn active_model(&self, name: &str) -> Option<ModelDescriptor> {
        self.models.active(name)
    }

    pub fn create_ab_test(
        &self,
        test_id: &str,
        model_name: &str,
        variants: Vec<AbVariant>,
    ) -> BrewResult<AbTest> {
        self.ab_tests.create(test_id, model_name, variants, Utc::now())
    }

    pub fn ab_test(&self, test_id: &str) -> BrewResult<AbTest> {
        self.ab_tests.get(test_id)
    }

    pub fn assign_variant(&self, test_id: &str, user_id: &str) -> BrewResult<VariantAssignment> {
        self.ab_tests.assign(test_id, user_id)
    }

    pub fn record_variant_outcome(
        &self,
        test_id: &str,
        variant_index: usize,
        outcome: VariantOutcome,
    ) -> BrewResult<()> {
        self.ab_tests.record_outcome(test_id, variant_index, outcome)
    }

    pub fn end_ab_test(&self, test_id: &str, now: DateTime<Utc>) -> BrewResult<AbTest> {
        self.ab_tests.end(test_id, now)
    }

    pub fn record_request(&self, name: &str, version: &str) {
        self.requests.record(name, version);
    }

    /// Running A/B test on the default model first, then the default
    /// model's active version, then the builtin hybrid.
    pub fn resolve_default(&self, user_id: &str) -> ResolvedModel {
        if let Some(test) = self.ab_tests.running_for_model(DEFAULT_MODEL_NAME) {
            if let Ok(assignment) = self.ab_tests.assign(&test.test_id, user_id) {
                return ResolvedModel {
                    model_name: DEFAULT_MODEL_NAME.to_string(),
                    model_version: assignment.model_version.clone(),
                    algorithm: assignment.algorithm,
                    assignment: Some(assignment),
                };
            }
        }
        match self.models.active(DEFAULT_MODEL_NAME) {
            Some(descriptor) => ResolvedModel {
                model_name: descriptor.name,
                model_version: descriptor.version,
                algorithm: descriptor.algorithm,
                assignment: None,
            },
            None => Self::builtin(Algorithm::default()),
        }
    }

    /// Version serving an explicitly requested algorithm: the default
    /// model when it runs that algorithm, else any active model that does.
    pub fn resolve_for(&self, algorithm: Algorithm) -> ResolvedModel {
        let descriptor = self
            .models
            .active(DEFAULT_MODEL_NAME)
            .filter(|d| d.algorithm == algorithm)
            .or_else(|| self.models.active_for_algorithm(algorithm));
        match descriptor {
            Some(d) => ResolvedModel {
                model_name: d.name,
                model_version: d.version,
                algorithm,
                assignment: None,
            },
            None => Self::builtin(algorithm),
        }
    }

    fn builtin(algorithm: Algorithm) -> ResolvedModel {
        ResolvedModel {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_version: BUILTIN_MODEL_VERSION.to_string(),
            algorithm,
            assignment: None,
        }
    }

    pub fn serving_stats(&self) -> ServingStats {
        ServingStats {
            active_models: self.models.active_models(),
            request_counts: self.requests.snapshot(),
            total_requests: self.requests.total(),
            running_tests: self.ab_tests.running_count(),
        }
    }
}
