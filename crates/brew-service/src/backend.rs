//! Storage selection: in-memory doubles or SQLite.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use brew_core::config::StorageConfig;
use brew_core::errors::BrewResult;
use brew_core::traits::{IEventStore, IMetricsStore};
use brew_storage::{MemoryStore, StorageEngine};

/// `db_path` value selecting the in-memory backend.
pub const MEMORY_DB_PATH: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite { path: PathBuf },
}

impl StorageBackend {
    /// `":memory:"` selects the in-memory doubles, anything else a SQLite file.
    pub fn from_config(config: &StorageConfig) -> Self {
        if config.db_path == MEMORY_DB_PATH {
            Self::Memory
        } else {
            Self::Sqlite {
                path: PathBuf::from(&config.db_path),
            }
        }
    }

    pub fn sqlite(path: impl AsRef<Path>) -> Self {
        Self::Sqlite {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn open(&self, config: &StorageConfig) -> BrewResult<Stores> {
        match self {
            Self::Memory => {
                let store = Arc::new(MemoryStore::new());
                Ok(Stores {
                    events: store.clone(),
                    metrics: store,
                })
            }
            Self::Sqlite { path } => {
                let engine = Arc::new(StorageEngine::open(path, config)?);
                tracing::info!(event = "storage_opened", path = %path.display());
                Ok(Stores {
                    events: engine.clone(),
                    metrics: engine,
                })
            }
        }
    }
}

/// Both ports backed by the same store.
#[derive(Clone)]
pub(crate) struct Stores {
    pub events: Arc<dyn IEventStore>,
    pub metrics: Arc<dyn IMetricsStore>,
}
