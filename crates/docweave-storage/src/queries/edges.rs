//! edges table queries.

use docweave_core::errors::StorageError;
use docweave_core::models::{Direction, EdgeKind, EdgeRecord};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use crate::to_storage_err;

const EDGE_COLUMNS: &str = "id, from_symbol_id, to_symbol_id, to_name, kind";

fn row_to_edge(row: &Row<'_>) -> rusqlite::Result<EdgeRecord> {
    let kind: String = row.get(4)?;
    let kind = kind
        .parse::<EdgeKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into()))?;
    Ok(EdgeRecord {
        id: row.get(0)?,
        from_symbol_id: row.get(1)?,
        to_symbol_id: row.get(2)?,
        to_name: row.get(3)?,
        kind,
    })
}

/// Insert an edge keyed by `(from, to_name, kind)`. A later write that
/// knows the resolved target fills it in; it never clears one.
pub fn put_edge(conn: &Connection, edge: &EdgeRecord) -> Result<i64, StorageError> {
    conn.prepare_cached(
        "INSERT INTO edges (from_symbol_id, to_symbol_id, to_name, kind)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(from_symbol_id, to_name, kind) DO UPDATE SET
            to_symbol_id = COALESCE(excluded.to_symbol_id, edges.to_symbol_id)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            edge.from_symbol_id,
            edge.to_symbol_id,
            edge.to_name,
            edge.kind.as_str(),
        ])
    })
    .map_err(to_storage_err)?;

    conn.query_row(
        "SELECT id FROM edges WHERE from_symbol_id = ?1 AND to_name = ?2 AND kind = ?3",
        params![edge.from_symbol_id, edge.to_name, edge.kind.as_str()],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}

/// Edges leaving or entering a symbol.
pub fn get_edges(
    conn: &Connection,
    symbol_id: i64,
    direction: Direction,
) -> Result<Vec<EdgeRecord>, StorageError> {
    let column = match direction {
        Direction::Outgoing => "from_symbol_id",
        Direction::Incoming => "to_symbol_id",
    };
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {EDGE_COLUMNS} FROM edges WHERE {column} = ?1 ORDER BY kind, to_name, id"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![symbol_id], row_to_edge)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Edges of `kind` targeting `name`, resolved or dangling.
pub fn get_edges_by_target_name(
    conn: &Connection,
    name: &str,
    kind: EdgeKind,
) -> Result<Vec<EdgeRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {EDGE_COLUMNS} FROM edges WHERE to_name = ?1 AND kind = ?2 ORDER BY id"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![name, kind.as_str()], row_to_edge)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Point dangling `references` edges at their target when exactly one
/// definition with that name exists. Returns the number of edges resolved.
pub fn resolve_dangling_references(conn: &Connection) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE edges SET to_symbol_id = (
             SELECT s.id FROM symbols s
             WHERE s.name = edges.to_name
               AND s.kind IN ('function', 'method', 'class', 'type')
         )
         WHERE to_symbol_id IS NULL
           AND kind = 'references'
           AND (SELECT COUNT(*) FROM symbols s
                WHERE s.name = edges.to_name
                  AND s.kind IN ('function', 'method', 'class', 'type')) = 1",
        [],
    )
    .map_err(to_storage_err)
}

pub fn count_edges(conn: &Connection) -> Result<usize, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get::<_, i64>(0))
        .map(|n| n as usize)
        .map_err(to_storage_err)
}
