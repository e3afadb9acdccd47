//! OpenAI-compatible `/embeddings` provider over blocking HTTP.

use std::time::Duration;

use docweave_core::errors::EmbeddingError;
use docweave_core::traits::IEmbeddingProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

pub struct HttpEmbeddingProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
}

impl HttpEmbeddingProvider {
    /// `api_key_env` names the variable holding the bearer token; the
    /// provider reports unavailable when it is unset.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key_env: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::ProviderUnavailable {
                provider: format!("http client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key: std::env::var(api_key_env).ok().filter(|k| !k.is_empty()),
            dimensions,
        })
    }

    fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EmbeddingError::ProviderUnavailable {
                provider: "http (no API key)".to_string(),
            })?;
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!("status {status}"),
            });
        }
        let mut body: EmbeddingResponse =
            response.json().map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("malformed body: {e}"),
            })?;
        if body.data.len() != texts.len() {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!("expected {} vectors, got {}", texts.len(), body.data.len()),
            });
        }
        body.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        debug!(count = texts.len(), model = %self.model, "remote embeddings received");
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

impl IEmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.request(&[text.to_string()])?
            .pop()
            .ok_or_else(|| EmbeddingError::InferenceFailed {
                reason: "empty response".to_string(),
            })
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "http"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}
