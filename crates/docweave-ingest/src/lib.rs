//! # docweave-ingest
//!
//! Walks a repository, chunks each supported file along structural
//! boundaries, extracts symbols and import/reference edges, and writes
//! everything to the store. Unsupported, binary, and unreadable files are
//! skipped and recorded, never fatal.

pub mod chunker;
pub mod language;
pub mod pipeline;
pub mod remote;
pub mod scanner;

pub use chunker::{Chunker, ChunkerRegistry, FileChunks};
pub use language::Language;
pub use pipeline::{IngestPipeline, IngestReport};
