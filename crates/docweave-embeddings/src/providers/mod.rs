//! Embedding providers.

mod http;
mod tfidf;

pub use http::HttpEmbeddingProvider;
pub use tfidf::TfIdfProvider;
