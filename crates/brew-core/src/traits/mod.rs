mod catalog;
mod event_store;
mod feature_cache;
mod health_probe;
mod metrics_sink;
mod metrics_store;
mod social_graph;

pub use catalog::ICatalog;
pub use event_store::IEventStore;
pub use feature_cache::IFeatureCache;
pub use health_probe::IHealthProbe;
pub use metrics_sink::IMetricsSink;
pub use metrics_store::IMetricsStore;
pub use social_graph::ISocialGraph;
