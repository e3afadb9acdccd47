//! symbols table queries.

use docweave_core::errors::StorageError;
use docweave_core::models::{SymbolKind, SymbolRecord};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::to_storage_err;

const SYMBOL_COLUMNS: &str =
    "id, chunk_id, file_path, name, kind, signature, parent, start_line, end_line";

/// Lookup key for `get_symbols`.
#[derive(Debug, Clone, Copy)]
pub enum SymbolFilter<'a> {
    File(&'a str),
    Name(&'a str),
}

pub(crate) fn row_to_symbol(row: &Row<'_>) -> rusqlite::Result<SymbolRecord> {
    let kind: String = row.get(4)?;
    let kind = kind.parse::<SymbolKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into())
    })?;
    Ok(SymbolRecord {
        id: row.get(0)?,
        chunk_id: row.get(1)?,
        file_path: row.get(2)?,
        name: row.get(3)?,
        kind,
        signature: row.get(5)?,
        parent: row.get(6)?,
        start_line: row.get(7)?,
        end_line: row.get(8)?,
    })
}

/// Insert a symbol unless it already exists for its chunk; returns its id.
pub fn put_symbol(conn: &Connection, symbol: &SymbolRecord) -> Result<i64, StorageError> {
    conn.prepare_cached(
        "INSERT OR IGNORE INTO symbols
         (chunk_id, file_path, name, kind, signature, parent, start_line, end_line)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            symbol.chunk_id,
            symbol.file_path,
            symbol.name,
            symbol.kind.as_str(),
            symbol.signature,
            symbol.parent,
            symbol.start_line,
            symbol.end_line,
        ])
    })
    .map_err(to_storage_err)?;

    conn.query_row(
        "SELECT id FROM symbols
         WHERE chunk_id = ?1 AND name = ?2 AND kind = ?3 AND start_line = ?4",
        params![
            symbol.chunk_id,
            symbol.name,
            symbol.kind.as_str(),
            symbol.start_line
        ],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}

/// Symbols by file (declaration order) or by exact name (path, line order).
pub fn get_symbols(
    conn: &Connection,
    filter: SymbolFilter<'_>,
) -> Result<Vec<SymbolRecord>, StorageError> {
    let (sql, key) = match filter {
        SymbolFilter::File(path) => (
            format!(
                "SELECT {SYMBOL_COLUMNS} FROM symbols WHERE file_path = ?1
                 ORDER BY start_line, end_line DESC, id"
            ),
            path,
        ),
        SymbolFilter::Name(name) => (
            format!(
                "SELECT {SYMBOL_COLUMNS} FROM symbols WHERE name = ?1
                 ORDER BY file_path, start_line, id"
            ),
            name,
        ),
    };
    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![key], row_to_symbol)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn get_symbol(conn: &Connection, id: i64) -> Result<Option<SymbolRecord>, StorageError> {
    conn.query_row(
        &format!("SELECT {SYMBOL_COLUMNS} FROM symbols WHERE id = ?1"),
        params![id],
        row_to_symbol,
    )
    .optional()
    .map_err(to_storage_err)
}

/// Symbols whose name contains `fragment` (case-insensitive), for audit.
pub fn search_symbols(
    conn: &Connection,
    fragment: &str,
    limit: usize,
) -> Result<Vec<SymbolRecord>, StorageError> {
    let pattern = format!("%{}%", escape_like(fragment));
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SYMBOL_COLUMNS} FROM symbols
             WHERE name LIKE ?1 ESCAPE '\\' AND kind != 'module'
             ORDER BY file_path, start_line LIMIT ?2"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![pattern, limit as i64], row_to_symbol)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn count_symbols(conn: &Connection) -> Result<usize, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM symbols WHERE kind != 'module'",
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as usize)
    .map_err(to_storage_err)
}

/// Escape `%`, `_` and `\` for a LIKE pattern using `\` as the escape.
pub(crate) fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
