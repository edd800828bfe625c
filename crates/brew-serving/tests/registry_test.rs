use chrono::{Duration, TimeZone, Utc};

use brew_core::models::{Algorithm, DeployRequest};
use brew_serving::ModelRegistry;

fn request(version: &str, algorithm: &str, replace: bool) -> DeployRequest {
    DeployRequest {
        name: "coffee-recommender".to_string(),
        version: version.to_string(),
        algorithm: Some(algorithm.to_string()),
        config: serde_json::json!({ "k": 10 }),
        replace_current_deployment: replace,
    }
}

fn at(hours: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
}

#[test]
fn first_deploy_activates() {
    let registry = ModelRegistry::new();
    let result = registry.deploy_at(request("v1", "hybrid", false), at(0)).unwrap();
    assert!(result.activated);
    assert!(result.superseded.is_none());
    assert_eq!(result.descriptor.algorithm, Algorithm::Hybrid);
    assert_eq!(registry.active("coffee-recommender").unwrap().version, "v1");
}

#[test]
fn second_deploy_without_replace_is_staged() {
    let registry = ModelRegistry::new();
    registry.deploy_at(request("v1", "hybrid", false), at(0)).unwrap();
    let staged = registry.deploy_at(request("v2", "popularity", false), at(1)).unwrap();
    assert!(!staged.activated);
    assert!(!staged.descriptor.is_active);
    assert_eq!(registry.active("coffee-recommender").unwrap().version, "v1");
    assert_eq!(registry.versions("coffee-recommender").len(), 2);
}

#[test]
fn replace_supersedes_and_leaves_one_active() {
    let registry = ModelRegistry::new();
    registry.deploy_at(request("v1", "hybrid", false), at(0)).unwrap();
    registry.deploy_at(request("v2", "popularity", false), at(1)).unwrap();
    let result = registry
        .deploy_at(request("v3", "content-based", true), at(2))
        .unwrap();

    assert!(result.activated);
    assert_eq!(result.superseded.unwrap().version, "v1");
    let active: Vec<_> = registry
        .versions("coffee-recommender")
        .into_iter()
        .filter(|d| d.is_active)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].version, "v3");
    assert_eq!(
        registry
            .active_for_algorithm(Algorithm::ContentBased)
            .unwrap()
            .version,
        "v3"
    );
    assert!(registry.active_for_algorithm(Algorithm::Hybrid).is_none());
}

#[test]
fn duplicate_version_rejected_without_changes() {
    let registry = ModelRegistry::new();
    registry.deploy_at(request("v1", "hybrid", false), at(0)).unwrap();
    let err = registry
        .deploy_at(request("v1", "popularity", true), at(1))
        .unwrap_err();
    assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    let versions = registry.versions("coffee-recommender");
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].algorithm, Algorithm::Hybrid);
    assert!(versions[0].is_active);
}

#[test]
fn invalid_requests_rejected() {
    let registry = ModelRegistry::new();

    let mut missing_name = request("v1", "hybrid", false);
    missing_name.name = " ".to_string();
    assert!(registry.deploy(missing_name).unwrap_err().to_string().contains("name"));

    let missing_version = request("", "hybrid", false);
    assert!(registry
        .deploy(missing_version)
        .unwrap_err()
        .to_string()
        .contains("version"));

    let mut missing_algorithm = request("v1", "hybrid", false);
    missing_algorithm.algorithm = None;
    assert!(registry
        .deploy(missing_algorithm)
        .unwrap_err()
        .to_string()
        .contains("algorithm"));

    let unknown = registry.deploy(request("v1", "deep-magic", false)).unwrap_err();
    assert!(unknown.to_string().contains("unknown algorithm"));

    assert!(registry.versions("coffee-recommender").is_empty());
    assert!(registry.active_models().is_empty());
}

#[test]
fn activate_switches_versions() {
    let registry = ModelRegistry::new();
    registry.deploy_at(request("v1", "hybrid", false), at(0)).unwrap();
    registry.deploy_at(request("v2", "social", false), at(1)).unwrap();

    let active = registry.activate("coffee-recommender", "v2").unwrap();
    assert_eq!(active.version, "v2");
    assert_eq!(registry.active("coffee-recommender").unwrap().version, "v2");

    let err = registry.activate("coffee-recommender", "v9").unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    let err = registry.activate("other", "v1").unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[test]
fn active_models_span_names() {
    let registry = ModelRegistry::new();
    registry.deploy_at(request("v1", "hybrid", false), at(0)).unwrap();
    let mut other = request("v1", "discovery", false);
    other.name = "explorer".to_string();
    registry.deploy_at(other, at(0)).unwrap();

    let names: Vec<_> = registry.active_models().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["coffee-recommender", "explorer"]);
}
