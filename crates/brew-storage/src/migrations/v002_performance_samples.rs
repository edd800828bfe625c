//! v002: performance_samples, the persisted side of the monitoring window.

pub const MIGRATION_SQL: &str = "
    CREATE TABLE IF NOT EXISTS performance_samples (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        model_version     TEXT NOT NULL,
        algorithm         TEXT NOT NULL,
        timestamp_ms      INTEGER NOT NULL,
        response_time_ms  REAL NOT NULL,
        clicked           INTEGER NOT NULL DEFAULT 0,
        converted         INTEGER NOT NULL DEFAULT 0,
        rating            REAL,
        errored           INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_samples_key_time
        ON performance_samples(model_version, algorithm, timestamp_ms);
    CREATE INDEX IF NOT EXISTS idx_samples_time ON performance_samples(timestamp_ms);
";
