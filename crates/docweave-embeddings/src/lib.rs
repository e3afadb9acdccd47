//! # docweave-embeddings
//!
//! Text-to-vector capability used as the optional third signal in hybrid
//! ranking. Providers are tried in order through a degradation chain; the
//! local TF-IDF provider is always last, so ranking never loses the signal
//! to a remote outage.

pub mod degradation;
pub mod engine;
pub mod providers;

pub use degradation::DegradationChain;
pub use engine::EmbeddingEngine;
pub use providers::{HttpEmbeddingProvider, TfIdfProvider};

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na <= f64::EPSILON || nb <= f64::EPSILON {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}
