//! Chunker subsystem: a `Chunker` per language, looked up by extension.

mod extract;
mod tree_sitter;

use std::collections::HashMap;
use std::path::Path;

use docweave_core::errors::IngestError;
use docweave_storage::{ChunkWrite, EdgeWrite, SymbolWrite};

use crate::language::Language;

pub use self::tree_sitter::{whole_file_chunks, TreeSitterChunker};

/// Chunks, symbols, and edges produced for one file. Symbol and edge
/// entries refer to chunks and symbols by index into these vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileChunks {
    pub chunks: Vec<ChunkWrite>,
    pub symbols: Vec<SymbolWrite>,
    pub edges: Vec<EdgeWrite>,
}

/// Splits a source file along structural boundaries.
pub trait Chunker: Send + Sync {
    fn language(&self) -> Language;
    fn extensions(&self) -> &[&str];
    fn chunk(&self, path: &Path, source: &str) -> Result<FileChunks, IngestError>;
}

/// Chunkers keyed by file extension. Later registrations win.
#[derive(Default)]
pub struct ChunkerRegistry {
    chunkers: Vec<Box<dyn Chunker>>,
    by_extension: HashMap<String, usize>,
}

impl ChunkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree-sitter chunkers for every built-in language.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for lang in Language::ALL {
            registry.register(Box::new(TreeSitterChunker::new(lang)));
        }
        registry
    }

    pub fn register(&mut self, chunker: Box<dyn Chunker>) {
        let index = self.chunkers.len();
        for ext in chunker.extensions() {
            self.by_extension.insert(ext.to_string(), index);
        }
        self.chunkers.push(chunker);
    }

    pub fn for_path(&self, path: &Path) -> Option<&dyn Chunker> {
        let ext = path.extension()?.to_str()?;
        self.by_extension
            .get(ext)
            .and_then(|&i| self.chunkers.get(i))
            .map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.chunkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunkers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlainText;

    impl Chunker for PlainText {
        fn language(&self) -> Language {
            Language::Python
        }
        fn extensions(&self) -> &[&str] {
            &["txt"]
        }
        fn chunk(&self, _path: &Path, source: &str) -> Result<FileChunks, IngestError> {
            Ok(FileChunks {
                chunks: vec![ChunkWrite {
                    start_line: 1,
                    end_line: source.lines().count().max(1) as u32,
                    text: source.to_string(),
                }],
                ..Default::default()
            })
        }
    }

    #[test]
    fn default_registry_covers_builtin_languages() {
        let registry = ChunkerRegistry::with_defaults();
        assert_eq!(registry.len(), 6);
        assert!(registry.for_path(Path::new("src/lib.rs")).is_some());
        assert!(registry.for_path(Path::new("app/view.tsx")).is_some());
        assert!(registry.for_path(Path::new("notes.txt")).is_none());
        assert!(registry.for_path(Path::new("Makefile")).is_none());
    }

    #[test]
    fn custom_chunker_is_pluggable() {
        let mut registry = ChunkerRegistry::with_defaults();
        registry.register(Box::new(PlainText));
        let chunker = registry.for_path(Path::new("notes.txt")).unwrap();
        let out = chunker.chunk(Path::new("notes.txt"), "a\nb\n").unwrap();
        assert_eq!(out.chunks[0].end_line, 2);
    }
}
