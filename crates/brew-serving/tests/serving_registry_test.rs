use brew_core::constants::{BUILTIN_MODEL_VERSION, DEFAULT_MODEL_NAME};
use brew_core::models::{AbVariant, Algorithm, DeployRequest};
use brew_serving::ServingRegistry;

fn deploy(registry: &ServingRegistry, version: &str, algorithm: &str) {
    registry
        .deploy_model(DeployRequest {
            name: DEFAULT_MODEL_NAME.to_string(),
            version: version.to_string(),
            algorithm: Some(algorithm.to_string()),
            config: serde_json::Value::Null,
            replace_current_deployment: true,
        })
        .unwrap();
}

#[test]
fn falls_back_to_builtin_hybrid() {
    let registry = ServingRegistry::new();
    let resolved = registry.resolve_default("alice");
    assert_eq!(resolved.algorithm, Algorithm::Hybrid);
    assert_eq!(resolved.model_version, BUILTIN_MODEL_VERSION);
    assert!(resolved.assignment.is_none());
}

#[test]
fn active_default_model_decides_algorithm() {
    let registry = ServingRegistry::new();
    deploy(&registry, "v1", "content-based");
    let resolved = registry.resolve_default("alice");
    assert_eq!(resolved.algorithm, Algorithm::ContentBased);
    assert_eq!(resolved.model_version, "v1");
}

#[test]
fn running_ab_test_wins_until_ended() {
    let registry = ServingRegistry::new();
    deploy(&registry, "v1", "content-based");
    registry
        .create_ab_test(
            "pop-only",
            DEFAULT_MODEL_NAME,
            vec![AbVariant {
                model_version: "v2".to_string(),
                algorithm: Algorithm::Popularity,
                traffic_share: 1.0,
            }],
        )
        .unwrap();

    let resolved = registry.resolve_default("alice");
    assert_eq!(resolved.algorithm, Algorithm::Popularity);
    assert_eq!(resolved.assignment.unwrap().test_id, "pop-only");

    registry.end_ab_test("pop-only", chrono::Utc::now()).unwrap();
    assert_eq!(registry.resolve_default("alice").model_version, "v1");
}

#[test]
fn explicit_algorithm_maps_to_serving_version() {
    let registry = ServingRegistry::new();
    deploy(&registry, "v1", "collaborative");
    assert_eq!(registry.resolve_for(Algorithm::Collaborative).model_version, "v1");
    let other = registry.resolve_for(Algorithm::Discovery);
    assert_eq!(other.model_version, BUILTIN_MODEL_VERSION);
    assert_eq!(other.algorithm, Algorithm::Discovery);
}

#[test]
fn stats_combine_models_tests_and_counts() {
    let registry = ServingRegistry::new();
    deploy(&registry, "v1", "hybrid");
    registry.record_request(DEFAULT_MODEL_NAME, "v1");
    registry.record_request(DEFAULT_MODEL_NAME, "v1");

    let stats = registry.serving_stats();
    assert_eq!(stats.active_models.len(), 1);
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.request_counts[0].requests, 2);
    assert_eq!(stats.running_tests, 0);
}
