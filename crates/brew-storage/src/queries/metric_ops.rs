//! Append, range read and retention purge for performance samples.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use brew_core::errors::{BrewError, BrewResult, StorageError};
use brew_core::models::{Algorithm, ModelKey, PerformanceSample};

use crate::{map_sqlite_err, to_storage_err};

pub fn append_samples(conn: &Connection, samples: &[PerformanceSample]) -> BrewResult<usize> {
    if samples.is_empty() {
        return Ok(0);
    }
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("append_samples begin: {e}")))?;
    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT INTO performance_samples (
                    model_version, algorithm, timestamp_ms, response_time_ms,
                    clicked, converted, rating, errored
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(map_sqlite_err)?;
        for s in samples {
            stmt.execute(params![
                s.model_version,
                s.algorithm.as_str(),
                s.timestamp.timestamp_millis(),
                s.response_time_ms,
                s.clicked,
                s.converted,
                s.rating,
                s.errored,
            ])
            .map_err(map_sqlite_err)?;
        }
    }
    tx.commit()
        .map_err(|e| to_storage_err(format!("append_samples commit: {e}")))?;
    Ok(samples.len())
}

type SampleRow = (String, String, i64, f64, bool, bool, Option<f64>, bool);

pub fn samples_since(
    conn: &Connection,
    key: Option<&ModelKey>,
    since: DateTime<Utc>,
) -> BrewResult<Vec<PerformanceSample>> {
    let (version, algorithm) = match key {
        Some(k) => (Some(k.model_version.as_str()), Some(k.algorithm.as_str())),
        None => (None, None),
    };
    let mut stmt = conn
        .prepare_cached(
            "SELECT model_version, algorithm, timestamp_ms, response_time_ms,
                    clicked, converted, rating, errored
             FROM performance_samples
             WHERE timestamp_ms >= ?1
               AND (?2 IS NULL OR model_version = ?2)
               AND (?3 IS NULL OR algorithm = ?3)
             ORDER BY timestamp_ms ASC, id ASC",
        )
        .map_err(map_sqlite_err)?;
    let rows = stmt
        .query_map(params![since.timestamp_millis(), version, algorithm], |row| {
            Ok::<SampleRow, rusqlite::Error>((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })
        .map_err(map_sqlite_err)?;

    let mut samples = Vec::new();
    for row in rows {
        let (model_version, algorithm, ts, response_time_ms, clicked, converted, rating, errored) =
            row.map_err(map_sqlite_err)?;
        let corrupt = |details: String| {
            BrewError::Storage(StorageError::CorruptRecord {
                id: format!("sample {model_version}@{ts}"),
                details,
            })
        };
        let algorithm = algorithm
            .parse::<Algorithm>()
            .map_err(|e| corrupt(e.to_string()))?;
        let timestamp = DateTime::from_timestamp_millis(ts)
            .ok_or_else(|| corrupt(format!("bad timestamp {ts}")))?;
        samples.push(PerformanceSample {
            timestamp,
            model_version,
            algorithm,
            response_time_ms,
            clicked,
            converted,
            rating,
            errored,
        });
    }
    Ok(samples)
}

pub fn purge_before(conn: &Connection, cutoff: DateTime<Utc>) -> BrewResult<usize> {
    conn.execute(
        "DELETE FROM performance_samples WHERE timestamp_ms < ?1",
        params![cutoff.timestamp_millis()],
    )
    .map_err(map_sqlite_err)
}
