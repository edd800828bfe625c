//! Error handling for brewlens.
//! One error enum per subsystem, `thiserror` only, aggregated into [`BrewError`].

pub mod brew_error;
pub mod catalog_error;
pub mod config_error;
pub mod storage_error;
pub mod validation_error;

pub use brew_error::{BrewError, BrewResult, EntityKind};
pub use catalog_error::CatalogError;
pub use config_error::ConfigError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;
