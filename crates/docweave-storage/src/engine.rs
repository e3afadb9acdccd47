//! StoreEngine: the public face of the store.
//!
//! Owns the `StoreDb`, routes writes to the serialized writer
//! (short IMMEDIATE transactions) and reads to the pool.

use std::path::Path;

use docweave_core::errors::StorageError;
use docweave_core::models::{ChunkRecord, Direction, EdgeKind, EdgeRecord, SymbolRecord};
use tracing::{debug, info};

use crate::connection::writer::with_immediate_transaction;
use crate::connection::StoreDb;
use crate::queries::export::StoreSnapshot;
use crate::queries::files::{FileRow, FileWrite, WriteOutcome};
use crate::queries::search::FtsHit;
use crate::queries::symbols::SymbolFilter;
use crate::queries::{chunks, edges, export, files, search, symbols};

/// Row counts for audit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    pub files: usize,
    pub chunks: usize,
    pub symbols: usize,
    pub edges: usize,
}

/// The embedded store for one repository.
pub struct StoreEngine {
    db: StoreDb,
}

impl StoreEngine {
    /// Open (or create) a persisted store file.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let db = StoreDb::open(path)?;
        info!(path = %path.display(), "opened persisted store");
        Ok(Self { db })
    }

    /// Open an ephemeral store, discarded when dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = StoreDb::open_in_memory()?;
        debug!("opened in-memory store");
        Ok(Self { db })
    }

    pub fn is_persistent(&self) -> bool {
        self.db.path().is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    // --- writes ---

    pub fn put_chunk(&self, chunk: &ChunkRecord) -> Result<i64, StorageError> {
        self.db
            .with_writer(|conn| with_immediate_transaction(conn, |tx| chunks::put_chunk(tx, chunk)))
    }

    pub fn put_symbol(&self, symbol: &SymbolRecord) -> Result<i64, StorageError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| symbols::put_symbol(tx, symbol))
        })
    }

    pub fn put_edge(&self, edge: &EdgeRecord) -> Result<i64, StorageError> {
        self.db
            .with_writer(|conn| with_immediate_transaction(conn, |tx| edges::put_edge(tx, edge)))
    }

    /// Atomically supersede everything stored for `file.path`.
    pub fn replace_file(&self, file: &FileWrite) -> Result<WriteOutcome, StorageError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| files::replace_file(tx, file))
        })
    }

    pub fn remove_file(&self, path: &str) -> Result<bool, StorageError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| files::remove_file(tx, path))
        })
    }

    /// Link dangling reference edges to unique definitions.
    pub fn resolve_references(&self) -> Result<usize, StorageError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| edges::resolve_dangling_references(tx))
        })
    }

    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.db.checkpoint()
    }

    // --- reads ---

    /// Lexical search, best first; ties by file path then start line.
    pub fn query_fts(&self, term: &str, limit: usize) -> Result<Vec<FtsHit>, StorageError> {
        self.db
            .with_reader(|conn| search::query_fts(conn, term, limit))
    }

    pub fn get_symbols(&self, filter: SymbolFilter<'_>) -> Result<Vec<SymbolRecord>, StorageError> {
        self.db.with_reader(|conn| symbols::get_symbols(conn, filter))
    }

    pub fn get_symbol(&self, id: i64) -> Result<Option<SymbolRecord>, StorageError> {
        self.db.with_reader(|conn| symbols::get_symbol(conn, id))
    }

    pub fn search_symbols(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<SymbolRecord>, StorageError> {
        self.db
            .with_reader(|conn| symbols::search_symbols(conn, fragment, limit))
    }

    pub fn get_edges(
        &self,
        symbol_id: i64,
        direction: Direction,
    ) -> Result<Vec<EdgeRecord>, StorageError> {
        self.db
            .with_reader(|conn| edges::get_edges(conn, symbol_id, direction))
    }

    pub fn get_edges_by_target_name(
        &self,
        name: &str,
        kind: EdgeKind,
    ) -> Result<Vec<EdgeRecord>, StorageError> {
        self.db
            .with_reader(|conn| edges::get_edges_by_target_name(conn, name, kind))
    }

    pub fn get_chunk(&self, id: i64) -> Result<Option<ChunkRecord>, StorageError> {
        self.db.with_reader(|conn| chunks::get_chunk(conn, id))
    }

    pub fn get_chunks_for_file(&self, path: &str) -> Result<Vec<ChunkRecord>, StorageError> {
        self.db
            .with_reader(|conn| chunks::get_chunks_for_file(conn, path))
    }

    pub fn get_chunks_overlapping(
        &self,
        path: &str,
        start: u32,
        end: u32,
    ) -> Result<Vec<ChunkRecord>, StorageError> {
        self.db
            .with_reader(|conn| chunks::get_chunks_overlapping(conn, path, start, end))
    }

    pub fn file_hash(&self, path: &str) -> Result<Option<String>, StorageError> {
        self.db.with_reader(|conn| files::file_hash(conn, path))
    }

    pub fn get_file(&self, path: &str) -> Result<Option<FileRow>, StorageError> {
        self.db.with_reader(|conn| files::get_file(conn, path))
    }

    pub fn list_files(&self) -> Result<Vec<FileRow>, StorageError> {
        self.db.with_reader(files::list_files)
    }

    pub fn stats(&self) -> Result<StoreStats, StorageError> {
        self.db.with_reader(|conn| {
            Ok(StoreStats {
                files: files::list_files(conn)?.len(),
                chunks: chunks::count_chunks(conn)?,
                symbols: symbols::count_symbols(conn)?,
                edges: edges::count_edges(conn)?,
            })
        })
    }

    /// Snapshot of every table, for audit tooling.
    pub fn export(&self) -> Result<StoreSnapshot, StorageError> {
        self.db.with_reader(export::export)
    }
}
