//! # brew-service
//!
//! Owns every engine of the personalization pipeline and exposes the
//! transport-agnostic operations a boundary layer calls. Background
//! maintenance runs on tokio once [`Maintenance::start`] is called.

pub mod backend;
pub mod maintenance;
pub mod probes;
pub mod requests;
pub mod service;
pub mod sink;

pub use backend::StorageBackend;
pub use maintenance::Maintenance;
pub use requests::AbTestRequest;
pub use service::{MetricsDelivery, PersonalizationService, ServiceOptions};
pub use sink::AsyncMetricsSink;
