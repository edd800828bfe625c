//! Single write connection. Serialized writes, no contention.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use brew_core::errors::BrewResult;

use super::pragmas::apply_pragmas;
use crate::{lock_poisoned, map_sqlite_err};

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, busy_timeout_ms: u32) -> BrewResult<Self> {
        let conn = Connection::open(path).map_err(map_sqlite_err)?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> BrewResult<Self> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> BrewResult<T>
    where
        F: FnOnce(&Connection) -> BrewResult<T>,
    {
        let guard = self.conn.lock().map_err(|_| lock_poisoned("write connection"))?;
        f(&guard)
    }
}
