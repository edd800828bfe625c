//! In-memory implementation of the event and metric ports, for tests and
//! single-process deployments.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use brew_core::errors::{BrewError, BrewResult, StorageError};
use brew_core::models::{DedupKey, InteractionEvent, ModelKey, PerformanceSample};
use brew_core::traits::{IEventStore, IMetricsStore};

use crate::lock_poisoned;
use crate::queries::event_ops::describe_key;

#[derive(Default)]
struct Inner {
    events: Vec<InteractionEvent>,
    by_id: HashMap<String, usize>,
    keys: HashSet<DedupKey>,
    samples: Vec<PerformanceSample>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> BrewResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| lock_poisoned("memory store"))
    }

    fn write(&self) -> BrewResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| lock_poisoned("memory store"))
    }

    /// Newest first, ties broken by id descending (same order as SQLite).
    fn sorted_newest_first<'a>(
        events: impl Iterator<Item = &'a InteractionEvent>,
        limit: usize,
    ) -> Vec<InteractionEvent> {
        let mut selected: Vec<&InteractionEvent> = events.collect();
        selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        selected.into_iter().take(limit).cloned().collect()
    }
}

impl Inner {
    fn contains(&self, event: &InteractionEvent) -> bool {
        self.by_id.contains_key(&event.id) || self.keys.contains(&event.dedup_key())
    }

    fn push(&mut self, event: &InteractionEvent) {
        self.by_id.insert(event.id.clone(), self.events.len());
        self.keys.insert(event.dedup_key());
        self.events.push(event.clone());
    }
}

impl IEventStore for MemoryStore {
    fn insert_event(&self, event: &InteractionEvent) -> BrewResult<()> {
        let mut inner = self.write()?;
        if inner.contains(event) {
            return Err(BrewError::Storage(StorageError::DuplicateEvent {
                key: describe_key(&event.dedup_key()),
            }));
        }
        inner.push(event);
        Ok(())
    }

    fn insert_events(&self, events: &[InteractionEvent]) -> BrewResult<usize> {
        let mut inner = self.write()?;
        let mut inserted = 0;
        for event in events {
            if !inner.contains(event) {
                inner.push(event);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn get_event(&self, id: &str) -> BrewResult<Option<InteractionEvent>> {
        let inner = self.read()?;
        Ok(inner.by_id.get(id).map(|idx| inner.events[*idx].clone()))
    }

    fn existing_keys(&self, keys: &[DedupKey]) -> BrewResult<HashSet<DedupKey>> {
        let inner = self.read()?;
        Ok(keys
            .iter()
            .filter(|k| inner.keys.contains(*k))
            .cloned()
            .collect())
    }

    fn recent_events(&self, user_id: &str, limit: usize) -> BrewResult<Vec<InteractionEvent>> {
        let inner = self.read()?;
        Ok(Self::sorted_newest_first(
            inner.events.iter().filter(|e| e.user_id == user_id),
            limit,
        ))
    }

    fn interacted_item_ids(&self, user_id: &str) -> BrewResult<HashSet<String>> {
        let inner = self.read()?;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.item_id.clone())
            .collect())
    }

    fn events_for_items(
        &self,
        item_ids: &[String],
        limit: usize,
    ) -> BrewResult<Vec<InteractionEvent>> {
        let wanted: HashSet<&str> = item_ids.iter().map(String::as_str).collect();
        let inner = self.read()?;
        Ok(Self::sorted_newest_first(
            inner.events.iter().filter(|e| wanted.contains(e.item_id.as_str())),
            limit,
        ))
    }

    fn events_by_users(
        &self,
        user_ids: &[String],
        limit: usize,
    ) -> BrewResult<Vec<InteractionEvent>> {
        let wanted: HashSet<&str> = user_ids.iter().map(String::as_str).collect();
        let inner = self.read()?;
        Ok(Self::sorted_newest_first(
            inner.events.iter().filter(|e| wanted.contains(e.user_id.as_str())),
            limit,
        ))
    }

    fn item_popularity(&self, since: DateTime<Utc>) -> BrewResult<HashMap<String, u64>> {
        let inner = self.read()?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for event in inner.events.iter().filter(|e| e.timestamp >= since) {
            *counts.entry(event.item_id.clone()).or_default() += 1;
        }
        Ok(counts)
    }

    fn count_events(&self) -> BrewResult<usize> {
        Ok(self.read()?.events.len())
    }

    fn ping(&self) -> BrewResult<()> {
        self.read().map(|_| ())
    }
}

impl IMetricsStore for MemoryStore {
    fn append_samples(&self, samples: &[PerformanceSample]) -> BrewResult<usize> {
        let mut inner = self.write()?;
        inner.samples.extend_from_slice(samples);
        Ok(samples.len())
    }

    fn samples_since(
        &self,
        key: Option<&ModelKey>,
        since: DateTime<Utc>,
    ) -> BrewResult<Vec<PerformanceSample>> {
        let inner = self.read()?;
        let mut samples: Vec<PerformanceSample> = inner
            .samples
            .iter()
            .filter(|s| s.timestamp >= since)
            .filter(|s| key.map_or(true, |k| s.key() == *k))
            .cloned()
            .collect();
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }

    fn purge_before(&self, cutoff: DateTime<Utc>) -> BrewResult<usize> {
        let mut inner = self.write()?;
        let before = inner.samples.len();
        inner.samples.retain(|s| s.timestamp >= cutoff);
        Ok(before - inner.samples.len())
    }
}
