//! Property tests: insert→get roundtrip, bulk insert idempotence.

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use brew_core::models::{EventMetadata, InteractionEvent, InteractionType};
use brew_core::traits::IEventStore;
use brew_storage::{MemoryStore, StorageEngine};

fn interaction_type() -> impl Strategy<Value = InteractionType> {
    prop::sample::select(InteractionType::ALL.to_vec())
}

fn make_event(
    id: usize,
    user: &str,
    item: &str,
    t: InteractionType,
    ts_ms: i64,
) -> InteractionEvent {
    let timestamp = DateTime::from_timestamp_millis(ts_ms).unwrap();
    InteractionEvent {
        id: format!("evt-{id}"),
        user_id: user.to_string(),
        item_id: item.to_string(),
        interaction_type: t,
        value: (t == InteractionType::Rating).then_some(3.0),
        timestamp,
        metadata: EventMetadata::default(),
        ingested_at: timestamp,
    }
}

proptest! {
    #[test]
    fn prop_insert_get_roundtrip(
        user in "[a-z][a-z0-9_]{0,15}",
        item in "[a-z][a-z0-9-]{0,15}",
        t in interaction_type(),
        ts_ms in 1_600_000_000_000i64..1_800_000_000_000i64,
    ) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let event = make_event(0, &user, &item, t, ts_ms);
        engine.insert_event(&event).unwrap();
        let back = engine.get_event(&event.id).unwrap().unwrap();
        prop_assert_eq!(back.user_id, user);
        prop_assert_eq!(back.item_id, item);
        prop_assert_eq!(back.interaction_type, t);
        prop_assert_eq!(back.value, event.value);
        prop_assert_eq!(back.timestamp, event.timestamp);
    }

    #[test]
    fn prop_bulk_insert_is_idempotent(
        specs in prop::collection::vec(
            ("[a-c]", "[x-z]", interaction_type(), 0i64..50),
            1..40,
        ),
    ) {
        let base = 1_700_000_000_000i64;
        let events: Vec<_> = specs
            .iter()
            .enumerate()
            .map(|(i, (u, it, t, off))| make_event(i, u, it, *t, base + off * 1000))
            .collect();

        let memory = MemoryStore::new();
        let sqlite = StorageEngine::open_in_memory().unwrap();
        for store in [&memory as &dyn IEventStore, &sqlite as &dyn IEventStore] {
            let first = store.insert_events(&events).unwrap();
            let second = store.insert_events(&events).unwrap();
            prop_assert_eq!(second, 0);
            prop_assert_eq!(store.count_events().unwrap(), first);
        }
        prop_assert_eq!(memory.count_events().unwrap(), sqlite.count_events().unwrap());
    }
}
