use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use brew_core::config::{FeatureConfig, RecommendationConfig};
use brew_core::constants::{BUILTIN_MODEL_VERSION, DEFAULT_MODEL_NAME};
use brew_core::errors::{BrewResult, CatalogError};
use brew_core::models::{
    AbVariant, Algorithm, CatalogFilter, CoffeeItem, DeployRequest, EventMetadata,
    InteractionEvent, InteractionType, PerformanceSample, RecommendationContext,
    RecommendationFeedback, RecommendationRequest,
};
use brew_core::traits::{ICatalog, IEventStore, IMetricsSink};
use brew_features::{FeatureCache, FeatureEngine};
use brew_recommend::RecommendationEngine;
use brew_serving::ServingRegistry;
use brew_storage::{InMemoryCatalog, InMemorySocialGraph, MemoryStore};

struct DownCatalog;

impl ICatalog for DownCatalog {
    fn get_item(&self, _: &str) -> BrewResult<Option<CoffeeItem>> {
        Err(down())
    }
    fn get_items(&self, _: &[String]) -> BrewResult<Vec<CoffeeItem>> {
        Err(down())
    }
    fn find_items(&self, _: &CatalogFilter) -> BrewResult<Vec<CoffeeItem>> {
        Err(down())
    }
}

fn down() -> brew_core::BrewError {
    CatalogError::Unavailable {
        reason: "catalog offline".into(),
    }
    .into()
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<PerformanceSample>>);

impl IMetricsSink for RecordingSink {
    fn submit(&self, sample: PerformanceSample) {
        self.0.lock().unwrap().push(sample);
    }
}

impl RecordingSink {
    fn samples(&self) -> Vec<PerformanceSample> {
        self.0.lock().unwrap().clone()
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
}

fn event(
    user: &str,
    item: &str,
    kind: InteractionType,
    value: Option<f64>,
    hours_ago: i64,
) -> InteractionEvent {
    let timestamp = now() - Duration::hours(hours_ago);
    InteractionEvent {
        id: format!("{user}-{item}-{kind}-{hours_ago}"),
        user_id: user.into(),
        item_id: item.into(),
        interaction_type: kind,
        value,
        timestamp,
        metadata: EventMetadata::default(),
        ingested_at: timestamp,
    }
}

fn catalog() -> Arc<InMemoryCatalog> {
    Arc::new(
        InMemoryCatalog::from_json(&test_fixtures::load_fixture_text(test_fixtures::CATALOG))
            .unwrap(),
    )
}

struct Harness {
    store: Arc<MemoryStore>,
    serving: Arc<ServingRegistry>,
    sink: Arc<RecordingSink>,
    engine: RecommendationEngine,
}

fn harness_with(
    config: RecommendationConfig,
    catalog: Arc<dyn ICatalog>,
    feature_catalog: Arc<dyn ICatalog>,
) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let feature_config = FeatureConfig::default();
    let cache = Arc::new(FeatureCache::new(
        feature_config.cache_ttl_secs,
        feature_config.cache_max_entries,
    ));
    let features = Arc::new(FeatureEngine::new(
        store.clone(),
        feature_catalog,
        cache,
        feature_config,
    ));
    let serving = Arc::new(ServingRegistry::new());
    let sink = Arc::new(RecordingSink::default());
    let engine = RecommendationEngine::new(features, catalog, store.clone(), serving.clone(), config)
        .with_metrics_sink(sink.clone());
    Harness {
        store,
        serving,
        sink,
        engine,
    }
}

fn harness() -> Harness {
    let catalog = catalog();
    harness_with(RecommendationConfig::default(), catalog.clone(), catalog)
}

fn crowd_views(store: &MemoryStore) {
    store
        .insert_events(&[
            event("u1", "col-huila", InteractionType::View, None, 1),
            event("u2", "col-huila", InteractionType::View, None, 2),
            event("u3", "col-huila", InteractionType::View, None, 3),
            event("u1", "ken-nyeri", InteractionType::View, None, 4),
        ])
        .unwrap();
}

fn ids(items: &[brew_core::models::RankedItem]) -> Vec<&str> {
    items.iter().map(|i| i.item_id.as_str()).collect()
}

#[test]
fn cold_start_user_gets_popularity() {
    let h = harness();
    crowd_views(&h.store);

    let response = h
        .engine
        .generate_recommendations_at("newbie", &RecommendationRequest::default(), now())
        .unwrap();

    assert!(response.cold_start);
    assert_eq!(response.algorithm, Algorithm::Popularity);
    assert_eq!(response.model_version, BUILTIN_MODEL_VERSION);
    assert_eq!(response.items.len(), 10);
    assert_eq!(
        &ids(&response.items)[..4],
        &["col-huila", "ken-nyeri", "pan-geisha", "ita-espresso"]
    );
    assert_eq!(response.items[0].rank, 1);
    assert!((response.items[0].score - 1.0).abs() < 1e-12);
    assert!(response.items[0].reason.is_none());
    assert!(!response.request_id.is_empty());
    assert_eq!(h.serving.serving_stats().total_requests, 1);

    assert!(h.sink.samples().is_empty(), "held for feedback");
    assert_eq!(h.engine.pending_feedback(), 1);
    let window = Duration::seconds(h.engine.config().feedback_window_secs as i64);
    assert_eq!(h.engine.flush_expired_feedback(now() + window - Duration::seconds(1)), 0);
    assert_eq!(h.engine.flush_expired_feedback(now() + window), 1);

    let samples = h.sink.samples();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].algorithm, Algorithm::Popularity);
    assert!(!samples[0].errored);
    assert!(!samples[0].clicked);
    assert_eq!(h.engine.pending_feedback(), 0);
}

#[test]
fn feedback_is_folded_into_the_served_sample() {
    let h = harness();
    let response = h
        .engine
        .generate_recommendations_at("newbie", &RecommendationRequest::default(), now())
        .unwrap();
    let feedback = RecommendationFeedback {
        clicked: true,
        converted: true,
        rating: Some(4.0),
    };
    h.engine.record_feedback(&response.request_id, &feedback).unwrap();

    let samples = h.sink.samples();
    assert_eq!(samples.len(), 1);
    assert!(samples[0].clicked);
    assert!(samples[0].converted);
    assert_eq!(samples[0].rating, Some(4.0));
    assert_eq!(samples[0].timestamp, now());
    assert_eq!(h.engine.pending_feedback(), 0);

    let again = h.engine.record_feedback(&response.request_id, &feedback).unwrap_err();
    assert_eq!(again.error_code(), "NOT_FOUND");
    assert_eq!(h.sink.samples().len(), 1);
}

#[test]
fn invalid_feedback_keeps_the_request_pending() {
    let h = harness();
    let response = h
        .engine
        .generate_recommendations_at("newbie", &RecommendationRequest::default(), now())
        .unwrap();
    let bad = RecommendationFeedback {
        rating: Some(9.0),
        ..Default::default()
    };
    let err = h.engine.record_feedback(&response.request_id, &bad).unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    let err = h
        .engine
        .record_feedback(" ", &RecommendationFeedback::default())
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert_eq!(h.engine.pending_feedback(), 1);
    assert!(h.sink.samples().is_empty());
}

#[test]
fn full_feedback_buffer_records_samples_as_served() {
    let catalog = catalog();
    let config = RecommendationConfig {
        max_pending_feedback: 1,
        ..Default::default()
    };
    let h = harness_with(config, catalog.clone(), catalog);
    for _ in 0..3 {
        h.engine
            .generate_recommendations_at("newbie", &RecommendationRequest::default(), now())
            .unwrap();
    }
    assert_eq!(h.engine.pending_feedback(), 1);
    assert_eq!(h.sink.samples().len(), 2);
}

#[test]
fn empty_user_id_is_rejected() {
    let h = harness();
    let err = h
        .engine
        .generate_recommendations("  ", &RecommendationRequest::default())
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert!(h.sink.samples().is_empty());
}

#[test]
fn interacted_and_excluded_items_are_skipped() {
    let h = harness();
    h.store
        .insert_events(&[event("alice", "pan-geisha", InteractionType::Purchase, None, 5)])
        .unwrap();
    let request = RecommendationRequest {
        exclude_item_ids: vec!["eth-guji".into(), "unknown".into()],
        limit: Some(50),
        ..Default::default()
    };

    let response = h.engine.generate_recommendations_at("alice", &request, now()).unwrap();
    let returned = ids(&response.items);
    assert_eq!(returned.len(), 10);
    assert!(!returned.contains(&"pan-geisha"));
    assert!(!returned.contains(&"eth-guji"));
}

#[test]
fn limit_is_capped_by_config() {
    let catalog = catalog();
    let config = RecommendationConfig {
        max_limit: 5,
        ..Default::default()
    };
    let h = harness_with(config, catalog.clone(), catalog);
    let request = RecommendationRequest {
        limit: Some(50),
        ..Default::default()
    };
    let response = h.engine.generate_recommendations_at("newbie", &request, now()).unwrap();
    assert_eq!(response.items.len(), 5);

    let none = RecommendationRequest {
        limit: Some(0),
        ..Default::default()
    };
    assert!(h
        .engine
        .generate_recommendations_at("newbie", &none, now())
        .unwrap()
        .items
        .is_empty());
}

#[test]
fn reasons_are_attached_on_request() {
    let h = harness();
    crowd_views(&h.store);
    let request = RecommendationRequest {
        include_reasons: true,
        ..Default::default()
    };
    let response = h.engine.generate_recommendations_at("newbie", &request, now()).unwrap();
    assert!(response
        .items
        .iter()
        .all(|i| i.reason.as_deref() == Some("Popular this week")));
}

#[test]
fn deployed_default_model_decides_algorithm() {
    let h = harness();
    h.store
        .insert_events(&[event("alice", "eth-yirgacheffe", InteractionType::Rating, Some(5.0), 3)])
        .unwrap();
    h.serving
        .deploy_model(DeployRequest {
            name: DEFAULT_MODEL_NAME.into(),
            version: "v1".into(),
            algorithm: Some("content-based".into()),
            config: serde_json::Value::Null,
            replace_current_deployment: false,
        })
        .unwrap();

    let response = h
        .engine
        .generate_recommendations_at("alice", &RecommendationRequest::default(), now())
        .unwrap();
    assert_eq!(response.algorithm, Algorithm::ContentBased);
    assert_eq!(response.model_version, "v1");
    assert_eq!(response.items[0].item_id, "pan-geisha");

    let stats = h.serving.serving_stats();
    assert_eq!(stats.request_counts[0].version, "v1");
    assert_eq!(stats.request_counts[0].requests, 1);
    h.engine
        .record_feedback(&response.request_id, &RecommendationFeedback::default())
        .unwrap();
    assert_eq!(h.sink.samples()[0].model_version, "v1");
}

#[test]
fn running_ab_test_assigns_variant() {
    let h = harness();
    h.store
        .insert_events(&[event("alice", "eth-yirgacheffe", InteractionType::Rating, Some(5.0), 3)])
        .unwrap();
    h.serving
        .create_ab_test(
            "exp",
            DEFAULT_MODEL_NAME,
            vec![AbVariant {
                model_version: "v2".into(),
                algorithm: Algorithm::Discovery,
                traffic_share: 1.0,
            }],
        )
        .unwrap();

    let response = h
        .engine
        .generate_recommendations_at("alice", &RecommendationRequest::default(), now())
        .unwrap();
    assert_eq!(response.algorithm, Algorithm::Discovery);
    assert_eq!(response.model_version, "v2");
    assert_eq!(response.ab_test.as_ref().unwrap().test_id, "exp");
    assert_eq!(h.serving.ab_test("exp").unwrap().metrics[0].requests, 1);

    h.engine
        .record_feedback(
            &response.request_id,
            &RecommendationFeedback {
                clicked: true,
                ..Default::default()
            },
        )
        .unwrap();
    let test = h.serving.ab_test("exp").unwrap();
    assert_eq!(test.metrics[0].clicks, 1);
    assert_eq!(test.metrics[0].conversions, 0);
}

#[test]
fn catalog_failure_emits_errored_sample() {
    let h = harness_with(
        RecommendationConfig::default(),
        Arc::new(DownCatalog),
        catalog(),
    );
    let err = h
        .engine
        .generate_recommendations_at("newbie", &RecommendationRequest::default(), now())
        .unwrap_err();
    assert_eq!(err.error_code(), "DEPENDENCY_FAILURE");

    let samples = h.sink.samples();
    assert_eq!(samples.len(), 1);
    assert!(samples[0].errored);
    assert_eq!(samples[0].algorithm, Algorithm::Hybrid);
}

#[test]
fn feature_failure_degrades_to_cold_start() {
    let h = harness_with(
        RecommendationConfig::default(),
        catalog(),
        Arc::new(DownCatalog),
    );
    h.store
        .insert_events(&[event("alice", "eth-yirgacheffe", InteractionType::Rating, Some(5.0), 3)])
        .unwrap();

    let request = RecommendationRequest {
        algorithm: Some(Algorithm::ContentBased),
        ..Default::default()
    };
    let response = h.engine.generate_recommendations_at("alice", &request, now()).unwrap();
    assert!(response.cold_start);
    assert_eq!(response.algorithm, Algorithm::Popularity);
}

#[test]
fn collaborative_follows_similar_users() {
    let h = harness();
    h.store
        .insert_events(&[
            event("alice", "eth-yirgacheffe", InteractionType::Rating, Some(5.0), 10),
            event("bob", "eth-yirgacheffe", InteractionType::Rating, Some(5.0), 9),
            event("bob", "sum-mandheling", InteractionType::Purchase, None, 8),
            event("carol", "bra-mogiana", InteractionType::Purchase, None, 7),
        ])
        .unwrap();
    let request = RecommendationRequest {
        algorithm: Some(Algorithm::Collaborative),
        include_reasons: true,
        ..Default::default()
    };
    let response = h.engine.generate_recommendations_at("alice", &request, now()).unwrap();
    assert_eq!(response.algorithm, Algorithm::Collaborative);
    assert_eq!(response.items[0].item_id, "sum-mandheling");
    assert!((response.items[0].score - 1.0).abs() < 1e-12);
    assert_eq!(
        response.items[0].reason.as_deref(),
        Some("Liked by a coffee drinker with similar taste")
    );
    assert_eq!(response.items[1].score, 0.0);
}

#[test]
fn hybrid_without_neighbors_blends_content_and_popularity() {
    let h = harness();
    h.store
        .insert_events(&[event("alice", "eth-yirgacheffe", InteractionType::Rating, Some(5.0), 10)])
        .unwrap();
    let response = h
        .engine
        .generate_recommendations_at("alice", &RecommendationRequest::default(), now())
        .unwrap();
    assert_eq!(response.algorithm, Algorithm::Hybrid);
    let top = &response.items[0];
    assert_eq!(top.item_id, "pan-geisha");
    // Content affinity 2/3 under weights 0.4 / (0.4 + 0.2); no popularity in the window.
    assert!((top.score - 0.4 * (2.0 / 3.0) / 0.6).abs() < 1e-9);
}

#[test]
fn social_restricts_to_connections_items() {
    let store = Arc::new(MemoryStore::new());
    let catalog = catalog();
    let feature_config = FeatureConfig::default();
    let cache = Arc::new(FeatureCache::new(60, 100));
    let features = Arc::new(FeatureEngine::new(
        store.clone(),
        catalog.clone(),
        cache,
        feature_config,
    ));
    let graph = Arc::new(InMemorySocialGraph::new());
    graph.connect("alice", "bob").unwrap();
    let engine = RecommendationEngine::new(
        features,
        catalog,
        store.clone(),
        Arc::new(ServingRegistry::new()),
        RecommendationConfig::default(),
    )
    .with_social_graph(graph);

    store
        .insert_events(&[
            event("alice", "eth-yirgacheffe", InteractionType::Rating, Some(5.0), 10),
            event("carol", "eth-guji", InteractionType::Rating, Some(5.0), 10),
            event("bob", "gua-antigua", InteractionType::Purchase, None, 8),
            event("bob", "col-narino", InteractionType::View, None, 7),
        ])
        .unwrap();

    let request = RecommendationRequest {
        algorithm: Some(Algorithm::Social),
        include_reasons: true,
        ..Default::default()
    };
    let response = engine.generate_recommendations_at("alice", &request, now()).unwrap();
    assert_eq!(response.algorithm, Algorithm::Social);
    assert_eq!(ids(&response.items), vec!["gua-antigua", "col-narino"]);
    assert_eq!(
        response.items[0].reason.as_deref(),
        Some("Enjoyed by one of your connections")
    );

    let lonely = engine.generate_recommendations_at("carol", &request, now()).unwrap();
    assert_eq!(lonely.algorithm, Algorithm::Popularity);
}

#[test]
fn location_context_boosts_origin() {
    let h = harness();
    h.store
        .insert_events(&[
            event("u1", "col-huila", InteractionType::View, None, 1),
            event("u1", "ken-nyeri", InteractionType::View, None, 2),
        ])
        .unwrap();

    let plain = h
        .engine
        .generate_recommendations_at("newbie", &RecommendationRequest::default(), now())
        .unwrap();
    assert_eq!(&ids(&plain.items)[..2], &["ken-nyeri", "col-huila"]);

    let request = RecommendationRequest {
        context: RecommendationContext {
            location: Some("Colombia".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let boosted = h.engine.generate_recommendations_at("newbie", &request, now()).unwrap();
    assert_eq!(&ids(&boosted.items)[..2], &["col-huila", "ken-nyeri"]);
}
