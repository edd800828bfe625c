use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CatalogError, ConfigError, StorageError, ValidationError};

/// Result alias used throughout the workspace.
pub type BrewResult<T> = Result<T, BrewError>;

/// Kinds of entity that can be looked up and missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Item,
    Event,
    Model,
    AbTest,
    AlertRule,
    Request,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Item => "item",
            Self::Event => "event",
            Self::Model => "model",
            Self::AbTest => "ab test",
            Self::AlertRule => "alert rule",
            Self::Request => "request",
        };
        f.write_str(name)
    }
}

/// Top-level error for every brewlens subsystem.
#[derive(Debug, thiserror::Error)]
pub enum BrewError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("degraded mode: {component} fell back to {fallback}")]
    Degraded { component: String, fallback: String },

    #[error("lock poisoned: {what}")]
    LockPoisoned { what: String },
}

impl BrewError {
    /// Shorthand for a [`BrewError::NotFound`].
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Stable machine-readable code for the error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Storage(StorageError::DuplicateEvent { .. }) => "DUPLICATE_EVENT",
            Self::Storage(_) | Self::Catalog(_) => "DEPENDENCY_FAILURE",
            Self::Config(_) => "CONFIGURATION_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Degraded { .. } => "DEGRADED",
            Self::LockPoisoned { .. } => "INTERNAL_ERROR",
        }
    }

    /// True when the error comes from a failing collaborator (storage or catalog).
    /// A duplicate event is a caller problem, not a dependency failure.
    pub fn is_dependency_failure(&self) -> bool {
        match self {
            Self::Storage(StorageError::DuplicateEvent { .. }) => false,
            Self::Storage(_) | Self::Catalog(_) => true,
            _ => false,
        }
    }

    /// True when retrying further work against the same dependency is pointless.
    pub fn is_unrecoverable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_unrecoverable(),
            Self::Catalog(CatalogError::Unavailable { .. }) => true,
            _ => false,
        }
    }
}
