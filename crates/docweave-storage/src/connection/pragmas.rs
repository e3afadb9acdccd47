//! SQLite pragmas for the writer and the read pool.

use docweave_core::errors::StorageError;
use rusqlite::Connection;

use crate::to_storage_err;

/// Pragmas for the write connection: WAL, NORMAL sync, FK enforcement.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA temp_store = MEMORY;
         PRAGMA cache_size = -16000;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(to_storage_err)
}

/// Pragmas for read-only pool connections.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA temp_store = MEMORY;
         PRAGMA cache_size = -8000;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(to_storage_err)
}
