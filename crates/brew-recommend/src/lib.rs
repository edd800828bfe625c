//! # brew-recommend
//!
//! Turns a user's feature snapshot into a ranked, optionally explained list
//! of coffees. Pipeline: resolve algorithm → gather candidates → score →
//! context modifiers → order → truncate → explain. Each served request's
//! performance sample waits for caller feedback before it reaches monitoring.

pub mod candidates;
pub mod context;
pub mod engine;
mod feedback;
pub mod ranking;
pub mod reasons;
pub mod scoring;

pub use engine::RecommendationEngine;
pub use scoring::{ScoreMap, Scored, ScoringInput};
