//! # docweave-retrieval
//!
//! Read-side queries shared by the agent tools and the citation pipeline:
//! lexical search with hybrid re-ranking, definition and reference lookup
//! over the symbol graph, and per-file structure views.

pub mod engine;
pub mod ranking;

pub use engine::RetrievalEngine;
pub use ranking::ScoredChunk;
