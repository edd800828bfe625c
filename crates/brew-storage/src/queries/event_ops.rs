//! Insert, dedup lookup and read paths for interaction events.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use brew_core::errors::{BrewError, BrewResult, StorageError};
use brew_core::models::{DedupKey, EventMetadata, InteractionEvent, InteractionType};

use crate::{map_sqlite_err, to_storage_err};

const EVENT_COLUMNS: &str = "id, user_id, item_id, interaction_type, value, timestamp_ms, \
                             metadata, ingested_at_ms";

/// Insert one event. A dedup-key or id collision is a `DuplicateEvent` error.
pub fn insert_event(conn: &Connection, event: &InteractionEvent) -> BrewResult<()> {
    let metadata = serde_json::to_string(&event.metadata)?;
    let result = conn.execute(
        "INSERT INTO interaction_events (
            id, user_id, item_id, interaction_type, value, timestamp_ms, metadata, ingested_at_ms
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.id,
            event.user_id,
            event.item_id,
            event.interaction_type.as_str(),
            event.value,
            event.timestamp.timestamp_millis(),
            metadata,
            event.ingested_at.timestamp_millis(),
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(inner, _))
            if inner.code == ErrorCode::ConstraintViolation =>
        {
            Err(BrewError::Storage(StorageError::DuplicateEvent {
                key: describe_key(&event.dedup_key()),
            }))
        }
        Err(e) => Err(map_sqlite_err(e)),
    }
}

/// Insert many events in one transaction, ignoring duplicates.
/// Returns the number of rows actually written.
pub fn bulk_insert(conn: &Connection, events: &[InteractionEvent]) -> BrewResult<usize> {
    if events.is_empty() {
        return Ok(0);
    }
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("bulk_insert begin: {e}")))?;

    let mut inserted = 0;
    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT OR IGNORE INTO interaction_events (
                    id, user_id, item_id, interaction_type, value, timestamp_ms,
                    metadata, ingested_at_ms
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(map_sqlite_err)?;
        for event in events {
            let metadata = serde_json::to_string(&event.metadata)?;
            inserted += stmt
                .execute(params![
                    event.id,
                    event.user_id,
                    event.item_id,
                    event.interaction_type.as_str(),
                    event.value,
                    event.timestamp.timestamp_millis(),
                    metadata,
                    event.ingested_at.timestamp_millis(),
                ])
                .map_err(map_sqlite_err)?;
        }
    }

    tx.commit()
        .map_err(|e| to_storage_err(format!("bulk_insert commit: {e}")))?;
    Ok(inserted)
}

pub fn get_event(conn: &Connection, id: &str) -> BrewResult<Option<InteractionEvent>> {
    let raw = conn
        .query_row(
            &format!("SELECT {EVENT_COLUMNS} FROM interaction_events WHERE id = ?1"),
            params![id],
            read_row,
        )
        .optional()
        .map_err(map_sqlite_err)?;
    raw.map(RawEventRow::into_event).transpose()
}

/// The subset of `keys` already stored.
pub fn existing_keys(conn: &Connection, keys: &[DedupKey]) -> BrewResult<HashSet<DedupKey>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT 1 FROM interaction_events
             WHERE user_id = ?1 AND item_id = ?2 AND interaction_type = ?3 AND timestamp_ms = ?4",
        )
        .map_err(map_sqlite_err)?;
    let mut found = HashSet::new();
    for key in keys {
        let exists = stmt
            .exists(params![
                key.user_id,
                key.item_id,
                key.interaction_type.as_str(),
                key.timestamp_ms
            ])
            .map_err(map_sqlite_err)?;
        if exists {
            found.insert(key.clone());
        }
    }
    Ok(found)
}

pub fn recent_events(
    conn: &Connection,
    user_id: &str,
    limit: usize,
) -> BrewResult<Vec<InteractionEvent>> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {EVENT_COLUMNS} FROM interaction_events
             WHERE user_id = ?1
             ORDER BY timestamp_ms DESC, id DESC
             LIMIT ?2"
        ))
        .map_err(map_sqlite_err)?;
    let rows = stmt
        .query_map(params![user_id, limit as i64], read_row)
        .map_err(map_sqlite_err)?;
    collect_events(rows)
}

pub fn interacted_item_ids(conn: &Connection, user_id: &str) -> BrewResult<HashSet<String>> {
    let mut stmt = conn
        .prepare_cached("SELECT DISTINCT item_id FROM interaction_events WHERE user_id = ?1")
        .map_err(map_sqlite_err)?;
    let rows = stmt
        .query_map(params![user_id], |row| row.get::<_, String>(0))
        .map_err(map_sqlite_err)?;
    rows.collect::<Result<HashSet<_>, _>>()
        .map_err(map_sqlite_err)
}

/// Events whose `column` is in `values`. The id list is passed as one JSON
/// array parameter, so there is no bound-variable limit.
fn events_where_in(
    conn: &Connection,
    column: &str,
    values: &[String],
    limit: usize,
) -> BrewResult<Vec<InteractionEvent>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let ids = serde_json::to_string(values)?;
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {EVENT_COLUMNS} FROM interaction_events
             WHERE {column} IN (SELECT value FROM json_each(?1))
             ORDER BY timestamp_ms DESC, id DESC
             LIMIT ?2"
        ))
        .map_err(map_sqlite_err)?;
    let rows = stmt
        .query_map(params![ids, limit as i64], read_row)
        .map_err(map_sqlite_err)?;
    collect_events(rows)
}

pub fn events_for_items(
    conn: &Connection,
    item_ids: &[String],
    limit: usize,
) -> BrewResult<Vec<InteractionEvent>> {
    events_where_in(conn, "item_id", item_ids, limit)
}

pub fn events_by_users(
    conn: &Connection,
    user_ids: &[String],
    limit: usize,
) -> BrewResult<Vec<InteractionEvent>> {
    events_where_in(conn, "user_id", user_ids, limit)
}

pub fn item_popularity(conn: &Connection, since: DateTime<Utc>) -> BrewResult<HashMap<String, u64>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT item_id, COUNT(*) FROM interaction_events
             WHERE timestamp_ms >= ?1
             GROUP BY item_id",
        )
        .map_err(map_sqlite_err)?;
    let rows = stmt
        .query_map(params![since.timestamp_millis()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(map_sqlite_err)?;
    let mut counts = HashMap::new();
    for row in rows {
        let (item_id, count) = row.map_err(map_sqlite_err)?;
        counts.insert(item_id, count.max(0) as u64);
    }
    Ok(counts)
}

pub fn count_events(conn: &Connection) -> BrewResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM interaction_events", [], |row| row.get(0))
        .map_err(map_sqlite_err)?;
    Ok(count.max(0) as usize)
}

pub fn describe_key(key: &DedupKey) -> String {
    format!(
        "{}/{}/{}@{}",
        key.user_id, key.item_id, key.interaction_type, key.timestamp_ms
    )
}

// ── Row mapping ──

struct RawEventRow {
    id: String,
    user_id: String,
    item_id: String,
    interaction_type: String,
    value: Option<f64>,
    timestamp_ms: i64,
    metadata: String,
    ingested_at_ms: i64,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawEventRow> {
    Ok(RawEventRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        item_id: row.get(2)?,
        interaction_type: row.get(3)?,
        value: row.get(4)?,
        timestamp_ms: row.get(5)?,
        metadata: row.get(6)?,
        ingested_at_ms: row.get(7)?,
    })
}

impl RawEventRow {
    fn into_event(self) -> BrewResult<InteractionEvent> {
        let corrupt = |details: String| {
            BrewError::Storage(StorageError::CorruptRecord {
                id: self.id.clone(),
                details,
            })
        };
        let interaction_type = self
            .interaction_type
            .parse::<InteractionType>()
            .map_err(|e| corrupt(e.to_string()))?;
        let timestamp = DateTime::from_timestamp_millis(self.timestamp_ms)
            .ok_or_else(|| corrupt(format!("bad timestamp {}", self.timestamp_ms)))?;
        let ingested_at = DateTime::from_timestamp_millis(self.ingested_at_ms)
            .ok_or_else(|| corrupt(format!("bad ingested_at {}", self.ingested_at_ms)))?;
        let metadata: EventMetadata =
            serde_json::from_str(&self.metadata).map_err(|e| corrupt(e.to_string()))?;
        Ok(InteractionEvent {
            id: self.id,
            user_id: self.user_id,
            item_id: self.item_id,
            interaction_type,
            value: self.value,
            timestamp,
            metadata,
            ingested_at,
        })
    }
}

fn collect_events<I>(rows: I) -> BrewResult<Vec<InteractionEvent>>
where
    I: Iterator<Item = rusqlite::Result<RawEventRow>>,
{
    let mut events = Vec::new();
    for row in rows {
        events.push(row.map_err(map_sqlite_err)?.into_event()?);
    }
    Ok(events)
}
