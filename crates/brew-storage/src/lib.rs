//! # brew-storage
//!
//! Storage ports implemented twice: a SQLite [`StorageEngine`] (migrations,
//! WAL, one writer plus a read pool) and in-memory doubles selected at
//! construction time.

pub mod catalog;
pub mod engine;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod social;

pub use catalog::InMemoryCatalog;
pub use engine::StorageEngine;
pub use memory::MemoryStore;
pub use social::InMemorySocialGraph;

use brew_core::errors::{BrewError, StorageError};

/// Wrap a message as a generic SQLite storage error.
pub(crate) fn to_storage_err(message: impl Into<String>) -> BrewError {
    BrewError::Storage(StorageError::SqliteError {
        message: message.into(),
    })
}

/// Classify a rusqlite error. Connectivity-class failures become
/// `StorageError::Unavailable` so batch callers can short-circuit.
pub(crate) fn map_sqlite_err(err: rusqlite::Error) -> BrewError {
    use rusqlite::ErrorCode;

    if let rusqlite::Error::SqliteFailure(ref inner, _) = err {
        match inner.code {
            ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::PermissionDenied => {
                return BrewError::Storage(StorageError::Unavailable {
                    reason: err.to_string(),
                });
            }
            _ => {}
        }
    }
    to_storage_err(err.to_string())
}

pub(crate) fn lock_poisoned(what: &str) -> BrewError {
    BrewError::LockPoisoned {
        what: what.to_string(),
    }
}
