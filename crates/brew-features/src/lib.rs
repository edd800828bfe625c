//! # brew-features
//!
//! Derives versioned per-user feature snapshots from stored events and the
//! catalog. Snapshots are cached with a TTL (moka); batch extraction runs on
//! a bounded rayon pool.

pub mod cache;
pub mod engine;
pub mod extractors;

pub use cache::FeatureCache;
pub use engine::{BatchExtraction, ExtractionFailure, FeatureEngine};
