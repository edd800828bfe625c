//! v001: interaction_events with the de-duplication key as a unique constraint.

pub const MIGRATION_SQL: &str = "
    CREATE TABLE IF NOT EXISTS interaction_events (
        id                TEXT PRIMARY KEY,
        user_id           TEXT NOT NULL,
        item_id           TEXT NOT NULL,
        interaction_type  TEXT NOT NULL,
        value             REAL,
        timestamp_ms      INTEGER NOT NULL,
        metadata          TEXT NOT NULL DEFAULT '{}',
        ingested_at_ms    INTEGER NOT NULL,
        UNIQUE (user_id, item_id, interaction_type, timestamp_ms)
    );

    CREATE INDEX IF NOT EXISTS idx_events_user_time
        ON interaction_events(user_id, timestamp_ms DESC);
    CREATE INDEX IF NOT EXISTS idx_events_item ON interaction_events(item_id);
    CREATE INDEX IF NOT EXISTS idx_events_time ON interaction_events(timestamp_ms);
";
