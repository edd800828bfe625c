use std::io::Write;

use brew_core::config::*;
use brew_core::errors::ConfigError;
use brew_core::models::InteractionType;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = BrewConfig::from_toml("").unwrap();

    // Storage defaults
    assert_eq!(config.storage.db_path, "brewlens.db");
    assert_eq!(config.storage.read_pool_size, 4);

    // Ingestion defaults
    assert_eq!(config.ingestion.default_batch_size, 500);
    assert!(config.ingestion.skip_duplicates);

    // Feature defaults
    assert_eq!(config.features.cache_ttl_secs, 3_600);
    assert_eq!(config.features.max_events_window, 1_000);
    assert_eq!(config.features.session_gap_minutes, 30);
    assert_eq!(config.features.preference_top_n, 5);

    // Recommendation defaults
    assert_eq!(config.recommendation.default_limit, 10);
    assert_eq!(config.recommendation.hybrid_weights.collaborative, 0.4);

    // Monitoring defaults
    assert_eq!(config.monitoring.window_size, 1_000);
    assert_eq!(config.monitoring.min_baseline_samples, 5);
    assert_eq!(config.monitoring.min_drift_samples, 10);
    assert_eq!(config.monitoring.thresholds.click_through_rate, 0.10);
    assert_eq!(config.monitoring.thresholds.mean_rating, 0.20);
    assert_eq!(config.monitoring.thresholds.response_time, 0.30);
    assert_eq!(config.monitoring.thresholds.error_rate, 0.05);
    assert_eq!(config.monitoring.thresholds.concept, 0.15);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json_logs);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[features]
cache_ttl_secs = 60

[features.interaction_weights]
purchase = 8.0

[monitoring.thresholds]
psi = 0.25
"#;
    let config = BrewConfig::from_toml(toml).unwrap();
    assert_eq!(config.features.cache_ttl_secs, 60);
    assert_eq!(
        config.features.interaction_weights.weight(InteractionType::Purchase),
        8.0
    );
    // Siblings keep defaults
    assert_eq!(
        config.features.interaction_weights.weight(InteractionType::View),
        1.0
    );
    assert_eq!(config.monitoring.thresholds.psi, 0.25);
    assert_eq!(config.monitoring.thresholds.click_through_rate, 0.10);
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let err = BrewConfig::from_toml("[storage\nbroken").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn validation_rejects_out_of_range_values() {
    let cases = [
        ("[ingestion]\ndefault_batch_size = 0", "ingestion.default_batch_size"),
        ("[ingestion]\ndefault_batch_size = 5000", "ingestion.default_batch_size"),
        ("[features]\ncache_ttl_secs = 0", "features.cache_ttl_secs"),
        ("[features]\nrecency_decay_rate = -1.0", "features.recency_decay_rate"),
        ("[recommendation]\ndefault_limit = 500", "recommendation.default_limit"),
        ("[monitoring]\nwindow_size = 3", "monitoring.window_size"),
        (
            "[monitoring]\nhealthy_response_ms = 2000\ndegraded_response_ms = 1000",
            "monitoring.healthy_response_ms",
        ),
        ("[observability]\nlog_level = \"loud\"", "observability.log_level"),
    ];
    for (toml, expected_field) in cases {
        match BrewConfig::from_toml(toml) {
            Err(ConfigError::ValidationFailed { field, .. }) => {
                assert_eq!(field, expected_field, "for {toml}")
            }
            other => panic!("expected ValidationFailed for {toml}, got {other:?}"),
        }
    }
}

#[test]
fn load_reads_file_and_missing_file_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[recommendation]\nmax_limit = 50").unwrap();
    let config = BrewConfig::load(file.path()).unwrap();
    assert_eq!(config.recommendation.max_limit, 50);

    let dir = tempfile::tempdir().unwrap();
    let config = BrewConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.recommendation.max_limit, 100);
}

#[test]
fn max_weight_is_the_largest_interaction_weight() {
    let weights = InteractionWeights::default();
    assert_eq!(weights.max_weight(), 5.0);
}

#[test]
fn durations_past_the_longest_span_are_rejected() {
    let cases = [
        ("[ingestion]\nmax_future_skew_secs = 400000000", "ingestion.max_future_skew_secs"),
        ("[ingestion]\nmax_future_skew_secs = -1", "ingestion.max_future_skew_secs"),
        ("[features]\ncache_ttl_secs = 400000000", "features.cache_ttl_secs"),
        ("[features]\nsweep_interval_secs = 400000000", "features.sweep_interval_secs"),
        ("[features]\nsession_gap_minutes = 6000000", "features.session_gap_minutes"),
        (
            "[recommendation]\npopularity_window_days = 4000",
            "recommendation.popularity_window_days",
        ),
        (
            "[recommendation]\nfeedback_window_secs = 0",
            "recommendation.feedback_window_secs",
        ),
        (
            "[recommendation]\nfeedback_window_secs = 400000000",
            "recommendation.feedback_window_secs",
        ),
        ("[monitoring]\nretention_days = 200000000", "monitoring.retention_days"),
        ("[monitoring]\nalert_cooldown_secs = 400000000", "monitoring.alert_cooldown_secs"),
        (
            "[monitoring]\ndrift_check_interval_secs = 400000000",
            "monitoring.drift_check_interval_secs",
        ),
        (
            "[monitoring]\nretention_interval_secs = 400000000",
            "monitoring.retention_interval_secs",
        ),
    ];
    for (toml, expected_field) in cases {
        match BrewConfig::from_toml(toml) {
            Err(ConfigError::ValidationFailed { field, .. }) => {
                assert_eq!(field, expected_field, "for {toml}")
            }
            other => panic!("expected ValidationFailed for {toml}, got {other:?}"),
        }
    }

    let longest = BrewConfig::from_toml("[monitoring]\nretention_days = 3652").unwrap();
    assert_eq!(longest.monitoring.retention_days, 3652);
}

#[test]
fn spans_are_clamped_for_unvalidated_values() {
    use brew_core::constants::MAX_SPAN_SECS;
    use chrono::Duration;

    let monitoring = MonitoringConfig {
        retention_days: 200_000_000,
        ..Default::default()
    };
    assert_eq!(monitoring.retention(), Duration::seconds(MAX_SPAN_SECS));
    assert_eq!(MonitoringConfig::default().retention(), Duration::days(7));

    assert_eq!(span_secs(-5), Duration::zero());
    assert_eq!(span_from_secs(u64::MAX), Duration::seconds(MAX_SPAN_SECS));
    assert_eq!(span_from_secs(90), Duration::seconds(90));
}
