use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::UserFeatureSnapshot;

/// TTL-bound snapshot cache. Entries are immutable; `put` replaces.
///
/// `get` never returns a snapshot whose `last_updated` is older than the TTL;
/// such entries are evicted on access.
pub trait IFeatureCache: Send + Sync {
    fn get(&self, user_id: &str, now: DateTime<Utc>) -> Option<Arc<UserFeatureSnapshot>>;
    fn put(&self, snapshot: Arc<UserFeatureSnapshot>);
    fn invalidate(&self, user_id: &str);
    /// Evicts every expired entry, returning how many were removed.
    fn sweep(&self, now: DateTime<Utc>) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
