//! V002: FTS5 lexical index over chunk text, kept in sync by triggers.

pub const MIGRATION_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
    text,
    file_path UNINDEXED,
    content = 'chunks',
    content_rowid = 'id',
    tokenize = "unicode61 tokenchars '_'"
);

CREATE TRIGGER IF NOT EXISTS chunks_fts_insert AFTER INSERT ON chunks BEGIN
    INSERT INTO chunks_fts(rowid, text, file_path)
    VALUES (new.id, new.text, new.file_path);
END;

CREATE TRIGGER IF NOT EXISTS chunks_fts_delete AFTER DELETE ON chunks BEGIN
    INSERT INTO chunks_fts(chunks_fts, rowid, text, file_path)
    VALUES ('delete', old.id, old.text, old.file_path);
END;
"#;
