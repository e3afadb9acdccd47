//! Hybrid ranking weights.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Weights for hybrid ranking. Tunable per project without code changes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Weight of the normalized lexical (FTS) score. Default: 0.60.
    pub lexical_weight: Option<f64>,
    /// Weight of graph proximity. Default: 0.25.
    pub graph_weight: Option<f64>,
    /// Weight of embedding cosine similarity. Default: 0.15.
    pub embedding_weight: Option<f64>,
    /// Max candidates returned by `search_text`. Default: 20.
    pub search_limit: Option<usize>,
}

impl RetrievalConfig {
    pub fn effective_lexical_weight(&self) -> f64 {
        self.lexical_weight.unwrap_or(defaults::DEFAULT_LEXICAL_WEIGHT)
    }

    pub fn effective_graph_weight(&self) -> f64 {
        self.graph_weight.unwrap_or(defaults::DEFAULT_GRAPH_WEIGHT)
    }

    pub fn effective_embedding_weight(&self) -> f64 {
        self.embedding_weight
            .unwrap_or(defaults::DEFAULT_EMBEDDING_WEIGHT)
    }

    pub fn effective_search_limit(&self) -> usize {
        self.search_limit.unwrap_or(defaults::DEFAULT_SEARCH_LIMIT)
    }

    pub(crate) fn merge_from(&mut self, other: &RetrievalConfig) {
        if other.lexical_weight.is_some() {
            self.lexical_weight = other.lexical_weight;
        }
        if other.graph_weight.is_some() {
            self.graph_weight = other.graph_weight;
        }
        if other.embedding_weight.is_some() {
            self.embedding_weight = other.embedding_weight;
        }
        if other.search_limit.is_some() {
            self.search_limit = other.search_limit;
        }
    }
}
