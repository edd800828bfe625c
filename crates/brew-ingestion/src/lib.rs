//! # brew-ingestion
//!
//! Interaction event intake: validation → enrichment → dedup → persistence.
//! Single events fail individually; batches are chunked, tolerate per-item and
//! per-chunk failures, and abort only on an unrecoverable store.

pub mod batch;
pub mod engine;
pub mod enrichment;
pub mod validation;

pub use engine::IngestionEngine;
pub use validation::{ValidatedInteraction, Validator};
