mod alert;
mod catalog;
mod drift;
mod features;
mod health;
mod interaction;
mod metrics;
mod recommendation;
mod serving;

pub use alert::{Alert, AlertRule, AlertSeverity, Comparison};
pub use catalog::{
    normalize_attribute, AttributeFamily, CatalogFilter, CoffeeItem, FlavorProfile, Origin,
    ProcessingDetails,
};
pub use drift::{
    DriftRecommendation, DriftResult, DriftSignals, DriftType, METHOD_INSUFFICIENT_DATA,
    METHOD_STATISTICAL,
};
pub use features::{
    BehavioralFeatures, DiversityFeatures, EngagementFeatures, PreferenceFeatures, Season,
    SocialFeatures, TemporalFeatures, TrendTag, UserFeatureSnapshot, WeightedAttribute,
};
pub use health::{ComponentHealth, HealthStatus, KeyStats, MonitoringStats, SystemHealth};
pub use interaction::{
    day_of_week, BatchItemError, BatchOptions, BatchReport, DedupKey, EventMetadata,
    IngestFailure, IngestResult, InteractionEvent, InteractionType, RawInteraction, TimeOfDay,
    ValidationReport,
};
pub use metrics::{
    Baseline, BaselineOutcome, Histogram, MetricAggregate, MetricKind, ModelKey,
    PerformanceSample,
};
pub use recommendation::{
    Algorithm, RankedItem, RecommendationContext, RecommendationFeedback, RecommendationRequest,
    RecommendationResponse, VariantAssignment,
};
pub use serving::{
    AbTest, AbVariant, DeployRequest, DeploymentResult, ModelDescriptor, RequestCount,
    ServingStats, VariantMetrics, VariantOutcome,
};
