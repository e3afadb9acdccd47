//! Language-model endpoint configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier. Default: "gpt-4o".
    pub model: Option<String>,
    /// OpenAI-compatible base URL.
    pub base_url: Option<String>,
    /// Environment variable holding the API key. Default: "OPENAI_API_KEY".
    pub api_key_env: Option<String>,
    /// Per-request timeout. Default: 120s.
    pub timeout_secs: Option<u64>,
    /// Retries after the first attempt. Default: 3.
    pub max_retries: Option<u32>,
    /// First backoff delay, doubled per retry. Default: 500ms.
    pub initial_backoff_ms: Option<u64>,
    /// Backoff ceiling. Default: 8000ms.
    pub max_backoff_ms: Option<u64>,
}

impl LlmConfig {
    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| defaults::DEFAULT_MODEL.to_string())
    }

    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| defaults::DEFAULT_BASE_URL.to_string())
    }

    pub fn effective_api_key_env(&self) -> String {
        self.api_key_env
            .clone()
            .unwrap_or_else(|| defaults::DEFAULT_API_KEY_ENV.to_string())
    }

    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs
            .unwrap_or(defaults::DEFAULT_LLM_TIMEOUT_SECS)
    }

    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(defaults::DEFAULT_LLM_MAX_RETRIES)
    }

    pub fn effective_initial_backoff_ms(&self) -> u64 {
        self.initial_backoff_ms
            .unwrap_or(defaults::DEFAULT_INITIAL_BACKOFF_MS)
    }

    pub fn effective_max_backoff_ms(&self) -> u64 {
        self.max_backoff_ms
            .unwrap_or(defaults::DEFAULT_MAX_BACKOFF_MS)
    }

    pub(crate) fn merge_from(&mut self, other: &LlmConfig) {
        if other.model.is_some() {
            self.model = other.model.clone();
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url.clone();
        }
        if other.api_key_env.is_some() {
            self.api_key_env = other.api_key_env.clone();
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.max_retries.is_some() {
            self.max_retries = other.max_retries;
        }
        if other.initial_backoff_ms.is_some() {
            self.initial_backoff_ms = other.initial_backoff_ms;
        }
        if other.max_backoff_ms.is_some() {
            self.max_backoff_ms = other.max_backoff_ms;
        }
    }
}
