//! Schema migrations using PRAGMA user_version.

pub mod v001_interaction_events;
pub mod v002_performance_samples;

use rusqlite::Connection;

use brew_core::errors::{BrewError, BrewResult, StorageError};

/// Latest schema version known to this build.
pub const LATEST_VERSION: u32 = 2;

fn migration_err(version: u32, err: rusqlite::Error) -> BrewError {
    BrewError::Storage(StorageError::MigrationFailed {
        version,
        reason: err.to_string(),
    })
}

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> BrewResult<u32> {
    let current = current_version(conn)?;

    let migrations: &[(&str, u32)] = &[
        (v001_interaction_events::MIGRATION_SQL, 1),
        (v002_performance_samples::MIGRATION_SQL, 2),
    ];

    let mut applied = 0;
    for (sql, version) in migrations {
        if current < *version {
            conn.execute_batch(sql)
                .map_err(|e| migration_err(*version, e))?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| migration_err(*version, e))?;
            tracing::info!(version = version, "applied migration");
            applied += 1;
        }
    }
    Ok(applied)
}

pub fn current_version(conn: &Connection) -> BrewResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| migration_err(0, e))
}
