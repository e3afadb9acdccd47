//! # docweave-storage
//!
//! Embedded SQLite store for chunks, symbols, and edges with an FTS5
//! lexical index. One serialized writer, a round-robin pool of read-only
//! readers, versioned migrations, and query modules per table.

pub mod connection;
pub mod engine;
pub mod migrations;
pub mod queries;

pub use engine::{StoreEngine, StoreStats};
pub use queries::export::StoreSnapshot;
pub use queries::files::{ChunkWrite, EdgeWrite, FileRow, FileWrite, SymbolWrite, WriteOutcome};
pub use queries::search::FtsHit;
pub use queries::symbols::SymbolFilter;

use docweave_core::errors::StorageError;

/// Convert any displayable error into a `StorageError`.
pub(crate) fn to_storage_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
