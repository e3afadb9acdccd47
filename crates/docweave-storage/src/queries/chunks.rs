//! chunks table queries.

use docweave_core::errors::StorageError;
use docweave_core::models::ChunkRecord;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::to_storage_err;

const CHUNK_COLUMNS: &str =
    "id, file_path, language, start_line, end_line, content_hash, text";

pub(crate) fn row_to_chunk(row: &Row<'_>) -> rusqlite::Result<ChunkRecord> {
    Ok(ChunkRecord {
        id: row.get(0)?,
        file_path: row.get(1)?,
        language: row.get(2)?,
        start_line: row.get(3)?,
        end_line: row.get(4)?,
        content_hash: row.get(5)?,
        text: row.get(6)?,
    })
}

/// Insert a chunk unless an identical one exists; returns its id either way.
pub fn put_chunk(conn: &Connection, chunk: &ChunkRecord) -> Result<i64, StorageError> {
    conn.prepare_cached(
        "INSERT OR IGNORE INTO chunks
         (file_path, language, start_line, end_line, content_hash, text)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            chunk.file_path,
            chunk.language,
            chunk.start_line,
            chunk.end_line,
            chunk.content_hash,
            chunk.text,
        ])
    })
    .map_err(to_storage_err)?;

    conn.query_row(
        "SELECT id FROM chunks
         WHERE file_path = ?1 AND content_hash = ?2 AND start_line = ?3 AND end_line = ?4",
        params![
            chunk.file_path,
            chunk.content_hash,
            chunk.start_line,
            chunk.end_line
        ],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}

pub fn get_chunk(conn: &Connection, id: i64) -> Result<Option<ChunkRecord>, StorageError> {
    conn.query_row(
        &format!("SELECT {CHUNK_COLUMNS} FROM chunks WHERE id = ?1"),
        params![id],
        row_to_chunk,
    )
    .optional()
    .map_err(to_storage_err)
}

/// All chunks of a file in line order.
pub fn get_chunks_for_file(
    conn: &Connection,
    file_path: &str,
) -> Result<Vec<ChunkRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {CHUNK_COLUMNS} FROM chunks WHERE file_path = ?1 ORDER BY start_line, end_line"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![file_path], row_to_chunk)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Chunks of a file whose line range overlaps `[start, end]`.
pub fn get_chunks_overlapping(
    conn: &Connection,
    file_path: &str,
    start: u32,
    end: u32,
) -> Result<Vec<ChunkRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {CHUNK_COLUMNS} FROM chunks
             WHERE file_path = ?1 AND start_line <= ?3 AND end_line >= ?2
             ORDER BY start_line, end_line"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![file_path, start, end], row_to_chunk)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn count_chunks(conn: &Connection) -> Result<usize, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get::<_, i64>(0))
        .map(|n| n as usize)
        .map_err(to_storage_err)
}
