//! Optional embedding capability.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Which embedding backend feeds hybrid ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Lexical + graph ranking only.
    None,
    /// Local hashed TF-IDF vectors.
    Tfidf,
    /// OpenAI-compatible `/embeddings` endpoint, TF-IDF as fallback.
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Default: tfidf.
    pub provider: Option<EmbeddingProviderKind>,
    /// Remote model name for the http provider.
    pub model: Option<String>,
    /// Remote base URL; falls back to `llm.base_url`.
    pub base_url: Option<String>,
    /// Vector size for the local provider. Default: 256.
    pub dimensions: Option<usize>,
}

impl EmbeddingConfig {
    pub fn effective_provider(&self) -> EmbeddingProviderKind {
        self.provider.unwrap_or(EmbeddingProviderKind::Tfidf)
    }

    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| defaults::DEFAULT_EMBEDDING_MODEL.to_string())
    }

    pub fn effective_dimensions(&self) -> usize {
        self.dimensions
            .unwrap_or(defaults::DEFAULT_EMBEDDING_DIMENSIONS)
    }

    pub(crate) fn merge_from(&mut self, other: &EmbeddingConfig) {
        if other.provider.is_some() {
            self.provider = other.provider;
        }
        if other.model.is_some() {
            self.model = other.model.clone();
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url.clone();
        }
        if other.dimensions.is_some() {
            self.dimensions = other.dimensions;
        }
    }
}
