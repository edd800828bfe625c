use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::errors::BrewResult;
use crate::models::{DedupKey, InteractionEvent};

/// Durable interaction event storage.
pub trait IEventStore: Send + Sync {
    // --- Writes ---
    /// Fails with `StorageError::DuplicateEvent` when the dedup key is already stored.
    fn insert_event(&self, event: &InteractionEvent) -> BrewResult<()>;
    /// Duplicates are ignored. Returns the number of events actually stored.
    fn insert_events(&self, events: &[InteractionEvent]) -> BrewResult<usize>;

    // --- Reads ---
    fn get_event(&self, id: &str) -> BrewResult<Option<InteractionEvent>>;
    /// The subset of `keys` that is already stored.
    fn existing_keys(&self, keys: &[DedupKey]) -> BrewResult<HashSet<DedupKey>>;
    /// Most recent events of one user, newest first.
    fn recent_events(&self, user_id: &str, limit: usize) -> BrewResult<Vec<InteractionEvent>>;
    fn interacted_item_ids(&self, user_id: &str) -> BrewResult<HashSet<String>>;
    /// Events on any of `item_ids`, newest first.
    fn events_for_items(
        &self,
        item_ids: &[String],
        limit: usize,
    ) -> BrewResult<Vec<InteractionEvent>>;
    /// Events of any of `user_ids`, newest first.
    fn events_by_users(
        &self,
        user_ids: &[String],
        limit: usize,
    ) -> BrewResult<Vec<InteractionEvent>>;
    /// Interaction count per item since `since`.
    fn item_popularity(&self, since: DateTime<Utc>) -> BrewResult<HashMap<String, u64>>;
    fn count_events(&self) -> BrewResult<usize>;

    // --- Health ---
    fn ping(&self) -> BrewResult<()>;
}
