//! Property tests: ingest-then-read round trip, batch idempotence.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use brew_core::config::IngestionConfig;
use brew_core::models::{BatchOptions, InteractionType, RawInteraction};
use brew_core::traits::IEventStore;
use brew_ingestion::IngestionEngine;
use brew_storage::{MemoryStore, StorageEngine};

fn interaction() -> impl Strategy<Value = RawInteraction> {
    (
        "[a-z][a-z0-9_]{0,10}",
        "[a-z][a-z0-9.-]{0,10}",
        prop::sample::select(InteractionType::ALL.to_vec()),
        1u32..=5,
        0i64..86_400,
    )
        .prop_map(|(user, item, kind, rating, offset)| {
            let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
                + chrono::Duration::seconds(offset);
            RawInteraction {
                user_id: Some(user),
                item_id: Some(item),
                interaction_type: Some(kind.as_str().to_string()),
                value: (kind == InteractionType::Rating).then_some(rating as f64),
                timestamp: Some(ts.to_rfc3339()),
                ..Default::default()
            }
        })
}

proptest! {
    #[test]
    fn prop_ingest_then_read_roundtrip(raw in interaction()) {
        let store = Arc::new(StorageEngine::open_in_memory().unwrap());
        let engine = IngestionEngine::new(store.clone(), IngestionConfig::default());
        let result = engine.ingest_single(&raw);
        prop_assert!(result.success);

        let stored = store.get_event(&result.event_id.unwrap()).unwrap().unwrap();
        prop_assert_eq!(Some(stored.user_id), raw.user_id);
        prop_assert_eq!(Some(stored.item_id), raw.item_id);
        prop_assert_eq!(Some(stored.interaction_type.as_str().to_string()), raw.interaction_type);
        prop_assert_eq!(stored.value, raw.value);
        prop_assert_eq!(Some(stored.timestamp.to_rfc3339()), raw.timestamp);
    }

    #[test]
    fn prop_batch_is_idempotent_when_skipping_duplicates(
        batch in prop::collection::vec(interaction(), 0..60),
        batch_size in 1usize..20,
    ) {
        let store = Arc::new(MemoryStore::new());
        let engine = IngestionEngine::new(store.clone(), IngestionConfig::default());
        let options = BatchOptions { batch_size: Some(batch_size), skip_duplicates: Some(true) };

        let first = engine.ingest_batch(&batch, &options);
        let stored = store.count_events().unwrap();
        prop_assert_eq!(first.processed, stored);
        prop_assert_eq!(first.processed + first.duplicates + first.failed, batch.len());

        let second = engine.ingest_batch(&batch, &options);
        prop_assert_eq!(second.processed, 0);
        prop_assert_eq!(second.duplicates, first.processed + first.duplicates);
        prop_assert_eq!(store.count_events().unwrap(), stored);
    }
}
