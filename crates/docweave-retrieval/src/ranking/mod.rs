//! Hybrid ranking: normalized lexical score, graph proximity, and optional
//! embedding cosine, combined with configured weights.

pub mod graph;
pub mod scorer;

pub use scorer::{rank, ScoredChunk};
