//! Traits at the seams between the pipeline and external capabilities.

pub mod cancellation;
pub mod embedding;
pub mod language_model;

pub use cancellation::{Cancellable, CancellationToken};
pub use embedding::IEmbeddingProvider;
pub use language_model::ILanguageModel;
