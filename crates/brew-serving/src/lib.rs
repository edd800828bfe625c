//! # brew-serving
//!
//! Tracks deployed model versions (one active per model name), runs A/B
//! tests with deterministic user → variant assignment, and counts requests
//! served per model version.

pub mod ab_testing;
pub mod assignment;
pub mod registry;
pub mod serving;
pub mod usage;

pub use ab_testing::AbTestManager;
pub use registry::ModelRegistry;
pub use serving::{ResolvedModel, ServingRegistry};
pub use usage::RequestCounter;
