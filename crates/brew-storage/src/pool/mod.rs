//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use brew_core::errors::BrewResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// The single write connection plus an optional read pool.
///
/// In-memory databases have no read pool: separate in-memory connections are
/// isolated databases, so reads go through the writer.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// The writer is opened first so the file exists before the
    /// read-only connections attach.
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u32) -> BrewResult<Self> {
        let writer = WriteConnection::open(path, busy_timeout_ms)?;
        let readers = ReadPool::open(path, read_pool_size, busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> BrewResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory()?,
            readers: None,
            db_path: None,
        })
    }
}
