//! # brew-core
//!
//! Foundation crate for the brewlens personalization pipeline.
//! Defines all types, traits, errors, config, events, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::BrewConfig;
pub use errors::{BrewError, BrewResult};
pub use models::{Algorithm, InteractionEvent, InteractionType, ModelKey, UserFeatureSnapshot};
