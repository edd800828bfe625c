use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use brew_core::models::{EventMetadata, InteractionEvent, InteractionType};
use brew_core::traits::IEventStore;
use brew_storage::StorageEngine;

fn make_events(n: usize) -> Vec<InteractionEvent> {
    let start = Utc::now();
    (0..n)
        .map(|i| {
            let ts = start + Duration::milliseconds(i as i64);
            InteractionEvent {
                id: format!("bench-{i}"),
                user_id: format!("user-{}", i % 50),
                item_id: format!("item-{}", i % 200),
                interaction_type: InteractionType::ALL[i % InteractionType::ALL.len()],
                value: None,
                timestamp: ts,
                metadata: EventMetadata::default(),
                ingested_at: ts,
            }
        })
        .collect()
}

fn bench_bulk_insert(c: &mut Criterion) {
    let events = make_events(1000);
    c.bench_function("bulk_insert_1000", |b| {
        b.iter(|| {
            let engine = StorageEngine::open_in_memory().unwrap();
            black_box(engine.insert_events(&events).unwrap());
        })
    });
}

fn bench_recent_events(c: &mut Criterion) {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.insert_events(&make_events(10_000)).unwrap();
    c.bench_function("recent_events_window", |b| {
        b.iter(|| black_box(engine.recent_events("user-7", 1000).unwrap()))
    });
}

criterion_group!(benches, bench_bulk_insert, bench_recent_events);
criterion_main!(benches);
