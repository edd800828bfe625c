//! PersonalizationService: owns every engine and exposes the pipeline's
//! operations. Built once per process and shared behind an `Arc`.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use brew_core::config::BrewConfig;
use brew_core::errors::{BrewError, BrewResult, ValidationError};
use brew_core::models::{
    AbTest, Alert, Algorithm, BaselineOutcome, BatchOptions, BatchReport, DeployRequest,
    DeploymentResult, DriftResult, IngestResult, MetricAggregate, MonitoringStats,
    PerformanceSample, RawInteraction, RecommendationFeedback, RecommendationRequest,
    RecommendationResponse, ServingStats, SystemHealth, UserFeatureSnapshot,
};
use brew_core::traits::{ICatalog, IFeatureCache, IMetricsSink, ISocialGraph};
use brew_features::{FeatureCache, FeatureEngine};
use brew_ingestion::IngestionEngine;
use brew_monitoring::tracing_setup::init_tracing;
use brew_monitoring::{MonitoringEngine, PurgeSummary};
use brew_recommend::RecommendationEngine;
use brew_serving::ServingRegistry;

use crate::backend::{StorageBackend, Stores};
use crate::probes::{CatalogProbe, StorageProbe};
use crate::requests::AbTestRequest;
use crate::sink::{AsyncMetricsSink, MetricsReceiver};

/// How recommendation samples reach monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricsDelivery {
    /// Recorded on the request thread.
    #[default]
    Direct,
    /// Queued on an unbounded channel drained by [`crate::Maintenance`].
    Channel,
}

/// Options for building the service.
pub struct ServiceOptions {
    pub config: BrewConfig,
    pub backend: StorageBackend,
    pub catalog: Arc<dyn ICatalog>,
    pub social: Option<Arc<dyn ISocialGraph>>,
    pub metrics_delivery: MetricsDelivery,
}

impl ServiceOptions {
    /// In-memory storage, direct metrics, no social graph.
    pub fn new(config: BrewConfig, catalog: Arc<dyn ICatalog>) -> Self {
        Self {
            config,
            backend: StorageBackend::Memory,
            catalog,
            social: None,
            metrics_delivery: MetricsDelivery::Direct,
        }
    }

    pub fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_social_graph(mut self, graph: Arc<dyn ISocialGraph>) -> Self {
        self.social = Some(graph);
        self
    }

    pub fn with_metrics_delivery(mut self, delivery: MetricsDelivery) -> Self {
        self.metrics_delivery = delivery;
        self
    }
}

pub struct PersonalizationService {
    config: BrewConfig,
    ingestion: IngestionEngine,
    features: Arc<FeatureEngine>,
    serving: Arc<ServingRegistry>,
    recommender: RecommendationEngine,
    monitoring: Arc<MonitoringEngine>,
    pending_metrics: Mutex<Option<MetricsReceiver>>,
}

impl PersonalizationService {
    pub fn new(options: ServiceOptions) -> BrewResult<Self> {
        let ServiceOptions {
            config,
            backend,
            catalog,
            social,
            metrics_delivery,
        } = options;
        config.validate()?;
        init_tracing(&config.observability);

        let Stores { events, metrics } = backend.open(&config.storage)?;

        let cache: Arc<dyn IFeatureCache> = Arc::new(FeatureCache::new(
            config.features.cache_ttl_secs,
            config.features.cache_max_entries,
        ));
        let ingestion = IngestionEngine::new(events.clone(), config.ingestion.clone())
            .with_feature_cache(cache.clone());

        let mut features = FeatureEngine::new(
            events.clone(),
            catalog.clone(),
            cache,
            config.features.clone(),
        );
        if let Some(graph) = &social {
            features = features.with_social_graph(graph.clone());
        }
        let features = Arc::new(features);

        let monitoring = Arc::new(
            MonitoringEngine::new(config.monitoring.clone())
                .with_metrics_store(metrics)
                .with_probe(Arc::new(StorageProbe::new(events.clone())))
                .with_probe(Arc::new(CatalogProbe::new(catalog.clone()))),
        );
        let since = Utc::now() - config.monitoring.retention();
        if let Err(e) = monitoring.load_persisted(since) {
            tracing::warn!(event = "metrics_reload_failed", error = %e);
        }

        let serving = Arc::new(ServingRegistry::new());
        let (sink, pending): (Arc<dyn IMetricsSink>, Option<MetricsReceiver>) =
            match metrics_delivery {
                MetricsDelivery::Direct => (monitoring.clone() as Arc<dyn IMetricsSink>, None),
                MetricsDelivery::Channel => {
                    let (sink, rx) = AsyncMetricsSink::channel();
                    (Arc::new(sink) as Arc<dyn IMetricsSink>, Some(rx))
                }
            };
        let mut recommender = RecommendationEngine::new(
            features.clone(),
            catalog,
            events,
            serving.clone(),
            config.recommendation.clone(),
        )
        .with_metrics_sink(sink);
        if let Some(graph) = social {
            recommender = recommender.with_social_graph(graph);
        }

        tracing::info!(
            event = "service_started",
            version = brew_core::constants::VERSION,
            metrics_delivery = ?metrics_delivery
        );
        Ok(Self {
            config,
            ingestion,
            features,
            serving,
            recommender,
            monitoring,
            pending_metrics: Mutex::new(pending),
        })
    }

    pub fn config(&self) -> &BrewConfig {
        &self.config
    }

    pub fn monitoring(&self) -> &Arc<MonitoringEngine> {
        &self.monitoring
    }

    pub fn serving(&self) -> &Arc<ServingRegistry> {
        &self.serving
    }

    /// The channel receiver, once. `None` with direct delivery.
    pub(crate) fn take_metrics_receiver(&self) -> BrewResult<Option<MetricsReceiver>> {
        let mut pending = self.pending_metrics.lock().map_err(|_| BrewError::LockPoisoned {
            what: "pending metrics receiver".to_string(),
        })?;
        Ok(pending.take())
    }

    // --- ingestion ---

    pub fn ingest(&self, raw: &RawInteraction) -> IngestResult {
        self.ingestion.ingest_single(raw)
    }

    pub fn ingest_batch(&self, raw: &[RawInteraction], options: &BatchOptions) -> BatchReport {
        self.ingestion.ingest_batch(raw, options)
    }

    // --- features ---

    pub fn features(&self, user_id: &str) -> BrewResult<Arc<UserFeatureSnapshot>> {
        self.features.extract_user_features(user_id, false)
    }

    pub fn refresh_features(&self, user_id: &str) -> BrewResult<Arc<UserFeatureSnapshot>> {
        self.features.extract_user_features(user_id, true)
    }

    /// Drop expired cache entries. Returns how many were evicted.
    pub fn sweep_features(&self, now: DateTime<Utc>) -> usize {
        self.features.sweep(now)
    }

    // --- recommendations ---

    pub fn recommendations(
        &self,
        user_id: &str,
        request: &RecommendationRequest,
    ) -> BrewResult<RecommendationResponse> {
        self.recommender.generate_recommendations(user_id, request)
    }

    /// Report what the user did with a response, by its `request_id`.
    pub fn record_feedback(
        &self,
        request_id: &str,
        feedback: &RecommendationFeedback,
    ) -> BrewResult<()> {
        self.recommender.record_feedback(request_id, feedback)
    }

    /// Record responses that got no feedback within the window as served.
    pub fn flush_expired_feedback(&self, now: DateTime<Utc>) -> usize {
        self.recommender.flush_expired_feedback(now)
    }

    pub fn pending_feedback(&self) -> usize {
        self.recommender.pending_feedback()
    }

    // --- serving ---

    pub fn deploy_model(&self, request: DeployRequest) -> BrewResult<DeploymentResult> {
        self.serving.deploy_model(request)
    }

    pub fn create_ab_test(&self, request: AbTestRequest) -> BrewResult<AbTest> {
        self.serving
            .create_ab_test(&request.test_id, &request.model_name, request.variants)
    }

    pub fn ab_test(&self, test_id: &str) -> BrewResult<AbTest> {
        self.serving.ab_test(test_id)
    }

    pub fn end_ab_test(&self, test_id: &str) -> BrewResult<AbTest> {
        self.serving.end_ab_test(test_id, Utc::now())
    }

    pub fn serving_stats(&self) -> ServingStats {
        self.serving.serving_stats()
    }

    // --- monitoring ---

    pub fn model_metrics(
        &self,
        model_version: &str,
        algorithm: Algorithm,
    ) -> BrewResult<MetricAggregate> {
        require_version(model_version)?;
        Ok(self.monitoring.model_metrics(model_version, algorithm))
    }

    pub fn detect_drift(&self, model_version: &str, algorithm: Algorithm) -> BrewResult<DriftResult> {
        self.monitoring.detect_model_drift(model_version, algorithm)
    }

    pub fn set_baseline(
        &self,
        model_version: &str,
        algorithm: Algorithm,
    ) -> BrewResult<BaselineOutcome> {
        self.monitoring.set_baseline(model_version, algorithm)
    }

    pub fn record_performance_metrics(&self, sample: PerformanceSample) -> BrewResult<Vec<Alert>> {
        self.monitoring.record_performance_metrics(sample)
    }

    pub fn health(&self) -> SystemHealth {
        self.monitoring.system_health()
    }

    pub fn monitoring_stats(&self) -> BrewResult<MonitoringStats> {
        self.monitoring.monitoring_stats()
    }

    /// Drift check across every baselined key. Returns how many drifted.
    pub fn run_drift_checks(&self, now: DateTime<Utc>) -> usize {
        self.monitoring
            .detect_all_drift(now)
            .iter()
            .filter(|result| result.is_drift_detected)
            .count()
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> BrewResult<PurgeSummary> {
        self.monitoring.purge_expired(now)
    }
}

fn require_version(model_version: &str) -> BrewResult<()> {
    if model_version.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "modelVersion",
        }
        .into());
    }
    Ok(())
}
