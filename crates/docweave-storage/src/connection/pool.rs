//! Read-only connections for retrieval and citation lookups, handed out
//! round-robin.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use docweave_core::errors::StorageError;
use rusqlite::{Connection, OpenFlags};

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

const MAX_READERS: usize = 8;

pub struct ReaderPool {
    readers: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReaderPool {
    /// One reader per available core, between 1 and `MAX_READERS`.
    pub fn sized_for_host(path: &Path) -> Result<Self, StorageError> {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self::open(path, cores)
    }

    pub fn open(path: &Path, readers: usize) -> Result<Self, StorageError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let readers = (0..readers.clamp(1, MAX_READERS))
            .map(|_| {
                let conn = Connection::open_with_flags(path, flags).map_err(to_storage_err)?;
                apply_read_pragmas(&conn)?;
                Ok(Mutex::new(conn))
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        Ok(Self {
            readers,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        f(&*lock(&self.readers[slot], "reader")?)
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }
}

pub(crate) fn lock<'a>(
    conn: &'a Mutex<Connection>,
    role: &str,
) -> Result<MutexGuard<'a, Connection>, StorageError> {
    conn.lock().map_err(|_| StorageError::SqliteError {
        message: format!("{role} connection lock poisoned"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreEngine;

    #[test]
    fn reader_count_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let _store = StoreEngine::open(&path).unwrap();

        assert_eq!(ReaderPool::open(&path, 0).unwrap().reader_count(), 1);
        assert_eq!(ReaderPool::open(&path, 64).unwrap().reader_count(), MAX_READERS);
        let pool = ReaderPool::sized_for_host(&path).unwrap();
        assert!((1..=MAX_READERS).contains(&pool.reader_count()));
    }

    #[test]
    fn readers_cannot_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let _store = StoreEngine::open(&path).unwrap();

        let pool = ReaderPool::open(&path, 2).unwrap();
        let result = pool.with_conn(|conn| {
            conn.execute_batch("DELETE FROM files;").map_err(to_storage_err)
        });
        assert!(result.is_err());
    }
}
