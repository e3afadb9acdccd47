//! Fallback chain for embedding generation.
//!
//! Providers are tried in order; each fallback past the first is recorded
//! as a `DegradationEvent` for the run metadata.

use std::sync::Mutex;

use chrono::Utc;
use docweave_core::errors::EmbeddingError;
use docweave_core::models::DegradationEvent;
use docweave_core::traits::IEmbeddingProvider;
use tracing::warn;

pub struct DegradationChain {
    chain: Vec<Box<dyn IEmbeddingProvider>>,
    events: Mutex<Vec<DegradationEvent>>,
}

impl Default for DegradationChain {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradationChain {
    pub fn new() -> Self {
        Self {
            chain: Vec::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Add a provider to the end of the chain.
    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.chain.push(provider);
    }

    /// Embed with the first provider that succeeds, returning its name.
    pub fn embed(&self, text: &str) -> Result<(Vec<f32>, &str), EmbeddingError> {
        self.first_success(|p| p.embed(text))
    }

    pub fn embed_batch(&self, texts: &[String]) -> Result<(Vec<Vec<f32>>, &str), EmbeddingError> {
        self.first_success(|p| p.embed_batch(texts))
    }

    fn first_success<T>(
        &self,
        call: impl Fn(&dyn IEmbeddingProvider) -> Result<T, EmbeddingError>,
    ) -> Result<(T, &str), EmbeddingError> {
        let mut last_error = None;
        let mut failed: Vec<&str> = Vec::new();

        for provider in &self.chain {
            if !provider.is_available() {
                failed.push(provider.name());
                continue;
            }
            match call(provider.as_ref()) {
                Ok(out) => {
                    if !failed.is_empty() {
                        self.record(DegradationEvent {
                            component: "embeddings".to_string(),
                            failure: format!("{} unavailable", failed.join(", ")),
                            fallback_used: provider.name().to_string(),
                            timestamp: Utc::now(),
                        });
                    }
                    return Ok((out, provider.name()));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "provider failed, trying next in chain"
                    );
                    failed.push(provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| EmbeddingError::ProviderUnavailable {
            provider: "all providers exhausted".to_string(),
        }))
    }

    /// Repeats of an already-recorded fallback are dropped.
    fn record(&self, event: DegradationEvent) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        let seen = events
            .iter()
            .any(|e| e.failure == event.failure && e.fallback_used == event.fallback_used);
        if !seen {
            events.push(event);
        }
    }

    /// First available provider, or "none".
    pub fn active_provider_name(&self) -> &str {
        self.chain
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    /// Drain accumulated degradation events.
    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;
    impl IEmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            })
        }
        fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            })
        }
        fn dimensions(&self) -> usize {
            8
        }
        fn name(&self) -> &str {
            "failing-mock"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    struct SuccessProvider {
        name: &'static str,
        dims: usize,
    }
    impl IEmbeddingProvider for SuccessProvider {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0; self.dims])
        }
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![1.0; self.dims]).collect())
        }
        fn dimensions(&self) -> usize {
            self.dims
        }
        fn name(&self) -> &str {
            self.name
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn primary_succeeds_no_degradation() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(SuccessProvider { name: "primary", dims: 16 }));
        chain.push(Box::new(SuccessProvider { name: "fallback", dims: 16 }));

        let (vec, name) = chain.embed("test").unwrap();
        assert_eq!(name, "primary");
        assert_eq!(vec.len(), 16);
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn fallback_on_primary_failure_is_recorded() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(FailingProvider));
        chain.push(Box::new(SuccessProvider { name: "fallback", dims: 4 }));

        let texts = vec!["a".to_string(), "b".to_string()];
        let (vecs, name) = chain.embed_batch(&texts).unwrap();
        assert_eq!(name, "fallback");
        assert_eq!(vecs.len(), 2);

        let events = chain.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].fallback_used, "fallback");
        assert!(events[0].failure.contains("failing-mock"));
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn all_fail_returns_error() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(FailingProvider));
        assert!(chain.embed("test").is_err());
        assert!(DegradationChain::new().embed("test").is_err());
    }
}
