//! Full-store snapshot for audit tooling.

use docweave_core::errors::StorageError;
use docweave_core::models::{ChunkRecord, EdgeRecord, SymbolRecord};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::chunks::row_to_chunk;
use super::files::{list_files, FileRow};
use super::symbols::row_to_symbol;
use crate::to_storage_err;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub files: Vec<FileRow>,
    pub chunks: Vec<ChunkRecord>,
    pub symbols: Vec<SymbolRecord>,
    pub edges: Vec<EdgeRecord>,
}

pub fn export(conn: &Connection) -> Result<StoreSnapshot, StorageError> {
    let files = list_files(conn)?;

    let mut stmt = conn
        .prepare(
            "SELECT id, file_path, language, start_line, end_line, content_hash, text
             FROM chunks ORDER BY file_path, start_line",
        )
        .map_err(to_storage_err)?;
    let chunks = stmt
        .query_map([], row_to_chunk)
        .map_err(to_storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_storage_err)?;

    let mut stmt = conn
        .prepare(
            "SELECT id, chunk_id, file_path, name, kind, signature, parent, start_line, end_line
             FROM symbols ORDER BY file_path, start_line, id",
        )
        .map_err(to_storage_err)?;
    let symbols = stmt
        .query_map([], row_to_symbol)
        .map_err(to_storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_storage_err)?;

    let mut edges = Vec::new();
    for symbol in &symbols {
        edges.extend(super::edges::get_edges(
            conn,
            symbol.id,
            docweave_core::models::Direction::Outgoing,
        )?);
    }

    Ok(StoreSnapshot {
        files,
        chunks,
        symbols,
        edges,
    })
}
