//! StorageEngine: owns the ConnectionPool, runs migrations at startup and
//! implements the event and metric ports on SQLite.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use brew_core::config::StorageConfig;
use brew_core::errors::BrewResult;
use brew_core::models::{DedupKey, InteractionEvent, ModelKey, PerformanceSample};
use brew_core::traits::{IEventStore, IMetricsStore};

use crate::map_sqlite_err;
use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{event_ops, metric_ops};

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path, config: &StorageConfig) -> BrewResult<Self> {
        let pool = ConnectionPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine. All reads go through the writer.
    pub fn open_in_memory() -> BrewResult<Self> {
        let engine = Self {
            pool: ConnectionPool::open_in_memory()?,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> BrewResult<()> {
        let applied = self.pool.writer.with_conn(migrations::run_migrations)?;
        tracing::debug!(
            applied,
            path = ?self.pool.db_path,
            "storage engine initialized"
        );
        Ok(())
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn schema_version(&self) -> BrewResult<u32> {
        self.with_reader(migrations::current_version)
    }

    /// File-backed: read pool (no writer contention). In-memory: the writer.
    fn with_reader<F, T>(&self, f: F) -> BrewResult<T>
    where
        F: FnOnce(&Connection) -> BrewResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        }
    }
}

impl IEventStore for StorageEngine {
    fn insert_event(&self, event: &InteractionEvent) -> BrewResult<()> {
        self.pool
            .writer
            .with_conn(|conn| event_ops::insert_event(conn, event))
    }

    fn insert_events(&self, events: &[InteractionEvent]) -> BrewResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| event_ops::bulk_insert(conn, events))
    }

    fn get_event(&self, id: &str) -> BrewResult<Option<InteractionEvent>> {
        self.with_reader(|conn| event_ops::get_event(conn, id))
    }

    fn existing_keys(&self, keys: &[DedupKey]) -> BrewResult<HashSet<DedupKey>> {
        self.with_reader(|conn| event_ops::existing_keys(conn, keys))
    }

    fn recent_events(&self, user_id: &str, limit: usize) -> BrewResult<Vec<InteractionEvent>> {
        self.with_reader(|conn| event_ops::recent_events(conn, user_id, limit))
    }

    fn interacted_item_ids(&self, user_id: &str) -> BrewResult<HashSet<String>> {
        self.with_reader(|conn| event_ops::interacted_item_ids(conn, user_id))
    }

    fn events_for_items(
        &self,
        item_ids: &[String],
        limit: usize,
    ) -> BrewResult<Vec<InteractionEvent>> {
        self.with_reader(|conn| event_ops::events_for_items(conn, item_ids, limit))
    }

    fn events_by_users(
        &self,
        user_ids: &[String],
        limit: usize,
    ) -> BrewResult<Vec<InteractionEvent>> {
        self.with_reader(|conn| event_ops::events_by_users(conn, user_ids, limit))
    }

    fn item_popularity(&self, since: DateTime<Utc>) -> BrewResult<HashMap<String, u64>> {
        self.with_reader(|conn| event_ops::item_popularity(conn, since))
    }

    fn count_events(&self) -> BrewResult<usize> {
        self.with_reader(event_ops::count_events)
    }

    fn ping(&self) -> BrewResult<()> {
        self.with_reader(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(map_sqlite_err)
        })
    }
}

impl IMetricsStore for StorageEngine {
    fn append_samples(&self, samples: &[PerformanceSample]) -> BrewResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| metric_ops::append_samples(conn, samples))
    }

    fn samples_since(
        &self,
        key: Option<&ModelKey>,
        since: DateTime<Utc>,
    ) -> BrewResult<Vec<PerformanceSample>> {
        self.with_reader(|conn| metric_ops::samples_since(conn, key, since))
    }

    fn purge_before(&self, cutoff: DateTime<Utc>) -> BrewResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| metric_ops::purge_before(conn, cutoff))
    }
}
