//! Model version registry. At most one active version per model name.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::info;

use brew_core::errors::{BrewError, BrewResult, ConfigError, EntityKind};
use brew_core::models::{Algorithm, DeployRequest, DeploymentResult, ModelDescriptor};

/// Descriptors per model name, in deploy order.
#[derive(Default)]
pub struct ModelRegistry {
    models: RwLock<BTreeMap<String, Vec<ModelDescriptor>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deploy(&self, request: DeployRequest) -> BrewResult<DeploymentResult> {
        self.deploy_at(request, Utc::now())
    }

    /// Register a version. With `replace_current_deployment` the new
    /// version becomes active and the previous active one is superseded.
    /// Otherwise it activates only when nothing is active yet, and is
    /// staged behind the active version.
    pub fn deploy_at(
        &self,
        request: DeployRequest,
        now: DateTime<Utc>,
    ) -> BrewResult<DeploymentResult> {
        let algorithm = validate_request(&request)?;

        let mut models = self.models.write().map_err(|_| lock_poisoned())?;
        let versions = models.entry(request.name.clone()).or_default();
        if versions.iter().any(|d| d.version == request.version) {
            return Err(ConfigError::DuplicateModelVersion {
                name: request.name,
                version: request.version,
            }
            .into());
        }

        let current = versions.iter().position(|d| d.is_active);
        let activate = request.replace_current_deployment || current.is_none();
        let superseded = match (activate, current) {
            (true, Some(index)) => {
                versions[index].is_active = false;
                Some(versions[index].clone())
            }
            _ => None,
        };

        let descriptor = ModelDescriptor {
            name: request.name,
            version: request.version,
            algorithm,
            config: request.config,
            deployed_at: now,
            is_active: activate,
        };
        versions.push(descriptor.clone());

        info!(
            event = "model_deployed",
            name = %descriptor.name,
            version = %descriptor.version,
            algorithm = %descriptor.algorithm,
            activated = activate,
            superseded = superseded.as_ref().map(|d| d.version.as_str()).unwrap_or("")
        );

        Ok(DeploymentResult {
            descriptor,
            activated: activate,
            superseded,
        })
    }

    /// Make a previously deployed version the active one.
    pub fn activate(&self, name: &str, version: &str) -> BrewResult<ModelDescriptor> {
        let mut models = self.models.write().map_err(|_| lock_poisoned())?;
        let versions = models
            .get_mut(name)
            .ok_or_else(|| BrewError::not_found(EntityKind::Model, name))?;
        let target = versions
            .iter()
            .position(|d| d.version == version)
            .ok_or_else(|| BrewError::not_found(EntityKind::Model, format!("{name}@{version}")))?;
        for (index, descriptor) in versions.iter_mut().enumerate() {
            descriptor.is_active = index == target;
        }
        info!(event = "model_activated", name, version);
        Ok(versions[target].clone())
    }

    pub fn active(&self, name: &str) -> Option<ModelDescriptor> {
        let models = self.models.read().ok()?;
        models
            .get(name)
            .and_then(|versions| versions.iter().find(|d| d.is_active).cloned())
    }

    /// Active descriptor of any model that serves `algorithm`, by name order.
    pub fn active_for_algorithm(&self, algorithm: Algorithm) -> Option<ModelDescriptor> {
        let models = self.models.read().ok()?;
        models
            .values()
            .flat_map(|versions| versions.iter())
            .find(|d| d.is_active && d.algorithm == algorithm)
            .cloned()
    }

    /// Every version of `name`, in deploy order.
    pub fn versions(&self, name: &str) -> Vec<ModelDescriptor> {
        self.models
            .read()
            .map(|models| models.get(name).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn active_models(&self) -> Vec<ModelDescriptor> {
        self.models
            .read()
            .map(|models| {
                models
                    .values()
                    .filter_map(|versions| versions.iter().find(|d| d.is_active).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn validate_request(request: &DeployRequest) -> BrewResult<Algorithm> {
    if request.name.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: "name".to_string(),
        }
        .into());
    }
    if request.version.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: "version".to_string(),
        }
        .into());
    }
    let raw = request
        .algorithm
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            field: "algorithm".to_string(),
        })?;
    Ok(raw.parse::<Algorithm>()?)
}

fn lock_poisoned() -> BrewError {
    BrewError::LockPoisoned {
        what: "model registry".to_string(),
    }
}
