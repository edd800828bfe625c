/// Storage-layer errors for event, snapshot, and metric persistence.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("duplicate event: {key}")]
    DuplicateEvent { key: String },

    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("corrupt record {id}: {details}")]
    CorruptRecord { id: String, details: String },
}

impl StorageError {
    /// Connectivity loss: the store cannot serve any further request.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
