//! OpenAI-compatible `/chat/completions` client over blocking HTTP.

use std::time::Duration;

use docweave_core::config::LlmSettings;
use docweave_core::errors::LlmError;
use docweave_core::models::{ChatRequest, ChatResponse};
use docweave_core::traits::ILanguageModel;
use reqwest::StatusCode;
use tracing::debug;

use crate::wire::{from_wire, to_wire, WireResponse};

pub struct OpenAiCompatibleClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiCompatibleClient {
    /// Build a client from resolved settings. The API key is read from the
    /// variable named by `api_key_env` once, here.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmError::MissingApiKey {
                var: settings.api_key_env.clone(),
            })?;
        Self::new(&settings.base_url, &settings.model, api_key, settings.timeout)
    }

    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                reason: format!("http client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
        })
    }

    fn send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout {
                after_secs: self.timeout.as_secs(),
            }
        } else {
            LlmError::RequestFailed {
                reason: e.to_string(),
            }
        }
    }
}

impl ILanguageModel for OpenAiCompatibleClient {
    fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&to_wire(&self.model, request))
            .send()
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(LlmError::RateLimited {
                    status: status.as_u16(),
                })
            }
            s if s.is_server_error() || s == StatusCode::REQUEST_TIMEOUT => {
                return Err(LlmError::RequestFailed {
                    reason: format!("status {s}"),
                })
            }
            s if !s.is_success() => {
                let body = response.text().unwrap_or_default();
                return Err(LlmError::InvalidResponse {
                    reason: format!("status {s}: {}", body.chars().take(200).collect::<String>()),
                });
            }
            _ => {}
        }

        let body: WireResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                self.send_error(e)
            } else {
                LlmError::InvalidResponse {
                    reason: format!("malformed body: {e}"),
                }
            }
        })?;
        let out = from_wire(body).ok_or_else(|| LlmError::InvalidResponse {
            reason: "no choices in response".to_string(),
        })?;
        debug!(
            model = %self.model,
            tool_calls = out.tool_calls.len(),
            has_text = out.content.is_some(),
            "chat completion received"
        );
        Ok(out)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_core::models::ChatMessage;

    fn client(url: &str) -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(url, "gpt-test", "secret", Duration::from_secs(5)).unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest::new(vec![ChatMessage::user("hello")])
    }

    #[test]
    fn parses_text_completion() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hi there"}}]}"#)
            .create();

        let out = client(&server.url()).complete(&request()).unwrap();
        assert_eq!(out.content.as_deref(), Some("hi there"));
        assert!(!out.has_tool_calls());
        mock.assert();
    }

    #[test]
    fn parses_tool_calls() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                r#"{"choices":[{"message":{"content":null,"tool_calls":[{"id":"abc","type":"function",
                "function":{"name":"read_file","arguments":"{\"path\":\"a.py\"}"}}]}}]}"#,
            )
            .create();

        let out = client(&server.url()).complete(&request()).unwrap();
        assert_eq!(out.tool_calls.len(), 1);
        assert_eq!(out.tool_calls[0].id, "abc");
        assert_eq!(out.tool_calls[0].arguments, r#"{"path":"a.py"}"#);
    }

    #[test]
    fn status_codes_map_to_errors() {
        let mut server = mockito::Server::new();
        let _limited = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .create();
        let err = client(&server.url()).complete(&request()).unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { status: 429 }));
        assert!(err.is_retryable());

        let mut server = mockito::Server::new();
        let _down = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .create();
        let err = client(&server.url()).complete(&request()).unwrap_err();
        assert!(err.is_retryable());

        let mut server = mockito::Server::new();
        let _bad = server
            .mock("POST", "/chat/completions")
            .with_status(400)
            .with_body("bad request")
            .create();
        let err = client(&server.url()).complete(&request()).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn missing_key_is_reported() {
        let settings = LlmSettings {
            api_key_env: "DOCWEAVE_TEST_LLM_KEY_UNSET".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            OpenAiCompatibleClient::from_settings(&settings),
            Err(LlmError::MissingApiKey { .. })
        ));
    }
}
