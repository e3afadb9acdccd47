//! V001: files, chunks, symbols, edges.

pub const MIGRATION_SQL: &str = r#"
-- One row per ingested file; the hash drives incremental re-ingestion.
CREATE TABLE IF NOT EXISTS files (
    path TEXT PRIMARY KEY,
    language TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    line_count INTEGER NOT NULL,
    ingested_at INTEGER NOT NULL
) STRICT;

-- Chunks are immutable per content hash. A changed file gets new rows and
-- the stale ones are deleted in the same transaction.
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_path TEXT NOT NULL,
    language TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    content_hash TEXT NOT NULL,
    text TEXT NOT NULL,
    UNIQUE(file_path, content_hash, start_line, end_line)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_chunks_file ON chunks(file_path, start_line);

CREATE TABLE IF NOT EXISTS symbols (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chunk_id INTEGER NOT NULL REFERENCES chunks(id) ON DELETE CASCADE,
    file_path TEXT NOT NULL,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    signature TEXT NOT NULL DEFAULT '',
    parent TEXT,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    UNIQUE(chunk_id, name, kind, start_line)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name);
CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_path, start_line);

-- Directed symbol graph. Unresolved targets stay as dangling names, so
-- cycles and external modules need no special handling.
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
    to_symbol_id INTEGER REFERENCES symbols(id) ON DELETE SET NULL,
    to_name TEXT NOT NULL,
    kind TEXT NOT NULL,
    UNIQUE(from_symbol_id, to_name, kind)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_edges_to_symbol ON edges(to_symbol_id)
    WHERE to_symbol_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_edges_to_name ON edges(to_name);
"#;
