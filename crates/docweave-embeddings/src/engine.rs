//! EmbeddingEngine: provider selection from config, the fallback chain,
//! and an in-memory vector cache. Implements `IEmbeddingProvider`.

use docweave_core::config::{EmbeddingConfig, EmbeddingProviderKind, LlmSettings};
use docweave_core::errors::EmbeddingError;
use docweave_core::models::DegradationEvent;
use docweave_core::traits::IEmbeddingProvider;
use moka::sync::Cache;
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::degradation::DegradationChain;
use crate::providers::{HttpEmbeddingProvider, TfIdfProvider};

const CACHE_CAPACITY: u64 = 4096;

/// Vectors keyed by the provider that produced them and the xxh3 of the text.
type VectorCache = Cache<(String, u64), Vec<f32>>;

pub struct EmbeddingEngine {
    chain: DegradationChain,
    cache: VectorCache,
    dimensions: usize,
}

impl EmbeddingEngine {
    pub fn new(chain: DegradationChain, dimensions: usize) -> Self {
        Self::with_cache_capacity(chain, dimensions, CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(chain: DegradationChain, dimensions: usize, capacity: u64) -> Self {
        Self {
            chain,
            cache: Cache::builder().max_capacity(capacity).build(),
            dimensions,
        }
    }

    /// Build the engine the config asks for. `None` means ranking runs
    /// without the embedding signal.
    pub fn from_config(config: &EmbeddingConfig, llm: &LlmSettings) -> Option<Self> {
        let dims = config.effective_dimensions();
        let mut chain = DegradationChain::new();
        match config.effective_provider() {
            EmbeddingProviderKind::None => return None,
            EmbeddingProviderKind::Tfidf => {}
            EmbeddingProviderKind::Http => {
                let base_url = config.base_url.clone().unwrap_or_else(|| llm.base_url.clone());
                match HttpEmbeddingProvider::new(
                    &base_url,
                    config.effective_model(),
                    &llm.api_key_env,
                    dims,
                    llm.timeout,
                ) {
                    Ok(provider) => chain.push(Box::new(provider)),
                    Err(e) => warn!(error = %e, "remote embeddings disabled"),
                }
            }
        }
        chain.push(Box::new(TfIdfProvider::new(dims)));
        info!(provider = chain.active_provider_name(), dims, "embedding engine initialized");
        Some(Self::new(chain, dims))
    }

    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        self.chain.drain_events()
    }

    fn cache_get(&self, text: &str, provider: &str) -> Option<Vec<f32>> {
        self.cache.get(&(provider.to_string(), xxh3_64(text.as_bytes())))
    }

    fn cache_put(&self, text: &str, provider: &str, vector: &[f32]) {
        self.cache
            .insert((provider.to_string(), xxh3_64(text.as_bytes())), vector.to_vec());
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let active = self.chain.active_provider_name().to_string();
        if let Some(hit) = self.cache_get(text, &active) {
            return Ok(hit);
        }
        let (vector, provider) = self.chain.embed(text)?;
        self.cache_put(text, provider, &vector);
        Ok(vector)
    }

    /// All vectors of one batch come from the same provider.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let active = self.chain.active_provider_name().to_string();
        let cached: Vec<Option<Vec<f32>>> =
            texts.iter().map(|t| self.cache_get(t, &active)).collect();
        if cached.iter().all(Option::is_some) {
            return Ok(cached.into_iter().flatten().collect());
        }

        let (vectors, provider) = self.chain.embed_batch(texts)?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        for (text, vector) in texts.iter().zip(&vectors) {
            self.cache_put(text, provider, vector);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        self.chain.active_provider_name()
    }

    fn is_available(&self) -> bool {
        self.chain.active_provider_name() != "none"
    }
}
