//! One serialized writer plus read-only readers.
//!
//! An in-memory store has no file to share, so it gets no readers and
//! every read goes through the writer.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use docweave_core::errors::StorageError;
use rusqlite::Connection;
use tracing::debug;

use self::pool::{lock, ReaderPool};
use self::pragmas::apply_pragmas;
use crate::migrations;
use crate::to_storage_err;

pub struct StoreDb {
    writer: Mutex<Connection>,
    readers: Option<ReaderPool>,
    path: Option<PathBuf>,
}

impl StoreDb {
    /// Create or reopen the store file, migrating it to the current schema.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(to_storage_err)?;
        }
        let writer = Self::prepared(Connection::open(path).map_err(to_storage_err)?)?;
        let readers = ReaderPool::sized_for_host(path)?;
        debug!(path = %path.display(), readers = readers.reader_count(), "store opened");
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Self::prepared(Connection::open_in_memory().map_err(to_storage_err)?)?;
        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    fn prepared(conn: Connection) -> Result<Connection, StorageError> {
        apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(conn)
    }

    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        f(&*lock(&self.writer, "writer")?)
    }

    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        match &self.readers {
            Some(readers) => readers.with_conn(f),
            None => self.with_writer(f),
        }
    }

    /// Fold the WAL back into the main file. No-op in memory.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        if self.path.is_none() {
            return Ok(());
        }
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(to_storage_err)
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
