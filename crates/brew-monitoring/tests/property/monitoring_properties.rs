use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use brew_core::config::MonitoringConfig;
use brew_core::models::{Algorithm, ModelKey, PerformanceSample};
use brew_monitoring::aggregate::aggregate;
use brew_monitoring::drift::psi;
use brew_monitoring::MonitoringEngine;

fn arb_sample() -> impl Strategy<Value = PerformanceSample> {
    (
        0.0f64..5_000.0,
        any::<bool>(),
        any::<bool>(),
        prop::option::of(1.0f64..=5.0),
        any::<bool>(),
        0i64..10_000,
    )
        .prop_map(|(response_time_ms, clicked, converted, rating, errored, offset)| {
            PerformanceSample {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + Duration::seconds(offset),
                model_version: "v1".into(),
                algorithm: Algorithm::Hybrid,
                response_time_ms,
                clicked,
                converted,
                rating,
                errored,
            }
        })
}

proptest! {
    #[test]
    fn rates_stay_in_unit_interval(samples in prop::collection::vec(arb_sample(), 0..60)) {
        let agg = aggregate(&samples);
        prop_assert_eq!(agg.sample_count, samples.len());
        for rate in [
            agg.click_through_rate,
            agg.conversion_rate,
            agg.error_rate,
            agg.engagement_rate,
        ] {
            prop_assert!((0.0..=1.0).contains(&rate));
        }
        prop_assert!(agg.engagement_rate >= agg.click_through_rate);
        if agg.rated_samples > 0 {
            prop_assert!((1.0 - 1e-9..=5.0 + 1e-9).contains(&agg.mean_rating));
        }
        prop_assert_eq!(agg.response_time_histogram.total() as usize, samples.len());
        prop_assert_eq!(agg.rating_histogram.total() as usize, agg.rated_samples);
    }

    #[test]
    fn psi_is_never_negative(
        a in prop::collection::vec(arb_sample(), 1..40),
        b in prop::collection::vec(arb_sample(), 1..40),
    ) {
        let (left, right) = (aggregate(&a), aggregate(&b));
        prop_assert!(psi(&left.response_time_histogram, &right.response_time_histogram) >= -1e-12);
    }

    #[test]
    fn window_never_exceeds_capacity(
        window_size in 1usize..30,
        samples in prop::collection::vec(arb_sample(), 0..80),
    ) {
        let engine = MonitoringEngine::new(MonitoringConfig { window_size, ..Default::default() });
        for sample in &samples {
            engine.record_performance_metrics_at(sample.clone(), sample.timestamp).unwrap();
        }
        let held = engine.sample_count(&ModelKey::new("v1", Algorithm::Hybrid));
        prop_assert_eq!(held, samples.len().min(window_size));
    }
}
