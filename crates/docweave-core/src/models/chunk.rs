use serde::{Deserialize, Serialize};

/// A structurally bounded span of a source file; the unit of citation and
/// retrieval. Never mutated once written: a changed file gets new chunks
/// under a new `content_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Store-assigned row id. Zero until persisted.
    pub id: i64,
    pub file_path: String,
    pub language: String,
    /// 1-indexed, inclusive.
    pub start_line: u32,
    /// 1-indexed, inclusive.
    pub end_line: u32,
    pub content_hash: String,
    pub text: String,
}

impl ChunkRecord {
    /// Whether `[start, end]` overlaps this chunk's line range.
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start <= self.end_line && end >= self.start_line
    }
}
