//! Property tests: engagement statistics stay in range for any rating history.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use brew_core::config::FeatureConfig;
use brew_core::models::{EventMetadata, InteractionEvent, InteractionType};
use brew_core::traits::IEventStore;
use brew_features::{FeatureCache, FeatureEngine};
use brew_storage::{InMemoryCatalog, MemoryStore};

fn build_engine(events: &[InteractionEvent]) -> FeatureEngine {
    let store = Arc::new(MemoryStore::new());
    store.insert_events(events).unwrap();
    let config = FeatureConfig::default();
    let cache = Arc::new(FeatureCache::new(config.cache_ttl_secs, config.cache_max_entries));
    FeatureEngine::new(store, Arc::new(InMemoryCatalog::default()), cache, config)
}

proptest! {
    #[test]
    fn prop_rating_statistics_in_range(
        ratings in prop::collection::vec(1u8..=5, 1..40),
        extra_views in 0usize..10,
    ) {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut events: Vec<InteractionEvent> = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| InteractionEvent {
                id: format!("r{i}"),
                user_id: "u".into(),
                item_id: format!("c{}", i % 7),
                interaction_type: InteractionType::Rating,
                value: Some(*r as f64),
                timestamp: base + Duration::minutes(i as i64 * 17),
                metadata: EventMetadata::default(),
                ingested_at: base,
            })
            .collect();
        events.extend((0..extra_views).map(|i| InteractionEvent {
            id: format!("v{i}"),
            user_id: "u".into(),
            item_id: "c0".into(),
            interaction_type: InteractionType::View,
            value: None,
            timestamp: base - Duration::hours(i as i64 + 1),
            metadata: EventMetadata::default(),
            ingested_at: base,
        }));

        let snapshot = build_engine(&events)
            .extract_user_features_at("u", false, base + Duration::days(1))
            .unwrap();
        let engagement = &snapshot.engagement;
        prop_assert!(engagement.average_rating >= 1.0 && engagement.average_rating <= 5.0);
        prop_assert!(engagement.rating_variance >= 0.0);
        prop_assert!(engagement.rating_variance <= 4.0);
        prop_assert_eq!(engagement.rating_count, ratings.len());
        prop_assert!((0.0..=1.0).contains(&engagement.purchase_rate));
        prop_assert!((0.0..=1.0).contains(&engagement.engagement_score));

        let tod: f64 = snapshot.behavioral.time_of_day_distribution.values().sum();
        prop_assert!((tod - 1.0).abs() < 1e-9);
        let seasons: f64 = snapshot.temporal.seasonal_weights.values().sum();
        prop_assert!((seasons - 1.0).abs() < 1e-9);
    }
}
