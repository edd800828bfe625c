//! # brew-monitoring
//!
//! Observes served recommendations: per-(model version, algorithm) rolling
//! windows, alert rules, baseline capture and drift scoring, dependency
//! health checks, plus the process-wide tracing subscriber.

pub mod aggregate;
pub mod alerts;
pub mod drift;
pub mod engine;
pub mod health;
pub mod tracing_setup;
pub mod window;

pub use alerts::AlertBook;
pub use engine::{MonitoringEngine, PurgeSummary};
pub use health::HealthReporter;
pub use window::SampleWindow;
