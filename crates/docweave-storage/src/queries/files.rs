//! files table queries and the per-file atomic replace.

use docweave_core::errors::StorageError;
use docweave_core::models::{ChunkRecord, EdgeKind, EdgeRecord, SymbolKind, SymbolRecord};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{chunks, edges, symbols};
use crate::to_storage_err;

/// A file row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRow {
    pub path: String,
    pub language: String,
    pub content_hash: String,
    pub line_count: u32,
    pub ingested_at: i64,
}

/// Everything ingestion produced for one file, written atomically.
#[derive(Debug, Clone, Default)]
pub struct FileWrite {
    pub path: String,
    pub language: String,
    pub content_hash: String,
    pub line_count: u32,
    pub chunks: Vec<ChunkWrite>,
    pub symbols: Vec<SymbolWrite>,
    pub edges: Vec<EdgeWrite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkWrite {
    pub start_line: u32,
    pub end_line: u32,
    pub text: String,
}

/// A symbol, attached to a chunk of the same `FileWrite` by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolWrite {
    pub chunk_index: usize,
    pub name: String,
    pub kind: SymbolKind,
    pub signature: String,
    pub parent: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
}

/// An edge from a symbol of the same `FileWrite` (by index). `to_local`
/// names a target symbol in the same file; otherwise the edge is written
/// dangling under `to_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeWrite {
    pub from_index: usize,
    pub to_name: String,
    pub to_local: Option<usize>,
    pub kind: EdgeKind,
}

/// What `replace_file` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Same path and hash already stored.
    Unchanged,
    Written {
        chunks: usize,
        symbols: usize,
        edges: usize,
        /// Stale chunks of an older hash deleted in the same transaction.
        pruned: usize,
    },
}

pub fn file_hash(conn: &Connection, path: &str) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT content_hash FROM files WHERE path = ?1",
        params![path],
        |row| row.get(0),
    )
    .optional()
    .map_err(to_storage_err)
}

pub fn get_file(conn: &Connection, path: &str) -> Result<Option<FileRow>, StorageError> {
    conn.query_row(
        "SELECT path, language, content_hash, line_count, ingested_at FROM files WHERE path = ?1",
        params![path],
        |row| {
            Ok(FileRow {
                path: row.get(0)?,
                language: row.get(1)?,
                content_hash: row.get(2)?,
                line_count: row.get(3)?,
                ingested_at: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}

pub fn list_files(conn: &Connection) -> Result<Vec<FileRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT path, language, content_hash, line_count, ingested_at
             FROM files ORDER BY path",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(FileRow {
                path: row.get(0)?,
                language: row.get(1)?,
                content_hash: row.get(2)?,
                line_count: row.get(3)?,
                ingested_at: row.get(4)?,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Write a file's chunks, symbols, and edges, superseding any rows stored
/// under an older hash. Must run inside a transaction.
pub fn replace_file(conn: &Connection, file: &FileWrite) -> Result<WriteOutcome, StorageError> {
    if file_hash(conn, &file.path)?.as_deref() == Some(file.content_hash.as_str()) {
        return Ok(WriteOutcome::Unchanged);
    }

    // Cascades to symbols and their edges; the FTS delete trigger fires per row.
    let pruned = conn
        .execute(
            "DELETE FROM chunks WHERE file_path = ?1 AND content_hash != ?2",
            params![file.path, file.content_hash],
        )
        .map_err(to_storage_err)?;

    conn.execute(
        "INSERT INTO files (path, language, content_hash, line_count, ingested_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(path) DO UPDATE SET
            language = excluded.language,
            content_hash = excluded.content_hash,
            line_count = excluded.line_count,
            ingested_at = excluded.ingested_at",
        params![
            file.path,
            file.language,
            file.content_hash,
            file.line_count,
            chrono::Utc::now().timestamp(),
        ],
    )
    .map_err(to_storage_err)?;

    let mut chunk_ids = Vec::with_capacity(file.chunks.len());
    for chunk in &file.chunks {
        let id = chunks::put_chunk(
            conn,
            &ChunkRecord {
                id: 0,
                file_path: file.path.clone(),
                language: file.language.clone(),
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                content_hash: file.content_hash.clone(),
                text: chunk.text.clone(),
            },
        )?;
        chunk_ids.push(id);
    }

    let mut symbol_ids = Vec::with_capacity(file.symbols.len());
    for symbol in &file.symbols {
        let chunk_id = *chunk_ids
            .get(symbol.chunk_index)
            .ok_or_else(|| StorageError::NotFound {
                what: format!("chunk #{} for symbol {}", symbol.chunk_index, symbol.name),
            })?;
        let id = symbols::put_symbol(
            conn,
            &SymbolRecord {
                id: 0,
                chunk_id,
                file_path: file.path.clone(),
                name: symbol.name.clone(),
                kind: symbol.kind,
                signature: symbol.signature.clone(),
                parent: symbol.parent.clone(),
                start_line: symbol.start_line,
                end_line: symbol.end_line,
            },
        )?;
        symbol_ids.push(id);
    }

    let mut edge_count = 0;
    for edge in &file.edges {
        let Some(&from_symbol_id) = symbol_ids.get(edge.from_index) else {
            continue;
        };
        let to_symbol_id = edge.to_local.and_then(|i| symbol_ids.get(i).copied());
        edges::put_edge(
            conn,
            &EdgeRecord {
                id: 0,
                from_symbol_id,
                to_symbol_id,
                to_name: edge.to_name.clone(),
                kind: edge.kind,
            },
        )?;
        edge_count += 1;
    }

    Ok(WriteOutcome::Written {
        chunks: chunk_ids.len(),
        symbols: symbol_ids.len(),
        edges: edge_count,
        pruned,
    })
}

/// Remove a file and everything derived from it.
pub fn remove_file(conn: &Connection, path: &str) -> Result<bool, StorageError> {
    conn.execute("DELETE FROM chunks WHERE file_path = ?1", params![path])
        .map_err(to_storage_err)?;
    let removed = conn
        .execute("DELETE FROM files WHERE path = ?1", params![path])
        .map_err(to_storage_err)?;
    Ok(removed > 0)
}
