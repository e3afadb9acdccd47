//! Lexical search over chunk text via FTS5, with a LIKE fallback.

use docweave_core::errors::StorageError;
use docweave_core::models::ChunkRecord;
use rusqlite::{params, Connection};
use tracing::debug;

use super::chunks::row_to_chunk;
use super::symbols::escape_like;
use crate::to_storage_err;

/// A chunk with its lexical relevance. Higher `score` is better.
#[derive(Debug, Clone, PartialEq)]
pub struct FtsHit {
    pub chunk: ChunkRecord,
    pub score: f64,
}

/// Build an FTS5 MATCH expression: every term quoted (embedded quotes
/// doubled) and OR-ed, so punctuation in the query cannot be read as
/// FTS syntax.
pub fn escape_fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Ranked lexical search. Ties in relevance are broken by file path then
/// start line. An empty query or empty index yields no hits.
pub fn query_fts(conn: &Connection, query: &str, limit: usize) -> Result<Vec<FtsHit>, StorageError> {
    let Some(expr) = escape_fts_query(query) else {
        return Ok(Vec::new());
    };

    match fts_match(conn, &expr, limit) {
        Ok(hits) => Ok(hits),
        Err(e) => {
            debug!(error = %e, query, "fts query failed, falling back to substring scan");
            like_scan(conn, query, limit)
        }
    }
}

fn fts_match(conn: &Connection, expr: &str, limit: usize) -> rusqlite::Result<Vec<FtsHit>> {
    // bm25() is lower-is-better; negate so callers see higher-is-better.
    let mut stmt = conn.prepare_cached(
        "SELECT c.id, c.file_path, c.language, c.start_line, c.end_line, c.content_hash, c.text,
                -bm25(chunks_fts) AS score
         FROM chunks_fts
         JOIN chunks c ON c.id = chunks_fts.rowid
         WHERE chunks_fts MATCH ?1
         ORDER BY score DESC, c.file_path, c.start_line
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![expr, limit as i64], |row| {
        Ok(FtsHit {
            chunk: row_to_chunk(row)?,
            score: row.get(7)?,
        })
    })?;
    rows.collect()
}

fn like_scan(conn: &Connection, query: &str, limit: usize) -> Result<Vec<FtsHit>, StorageError> {
    let pattern = format!("%{}%", escape_like(query.trim()));
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, file_path, language, start_line, end_line, content_hash, text
             FROM chunks WHERE text LIKE ?1 ESCAPE '\\'
             ORDER BY file_path, start_line LIMIT ?2",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![pattern, limit as i64], |row| {
            Ok(FtsHit {
                chunk: row_to_chunk(row)?,
                score: 1.0,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_ors_terms() {
        assert_eq!(
            escape_fts_query("parse \"config\"").unwrap(),
            "\"parse\" OR \"\"\"config\"\"\""
        );
        assert!(escape_fts_query("   ").is_none());
    }
}
