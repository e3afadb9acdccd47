//! # docweave-llm
//!
//! The language-model capability: an OpenAI-compatible chat client over
//! blocking HTTP and a retry wrapper that applies timeout, exponential
//! backoff, and cancellation to any `ILanguageModel`.

pub mod client;
pub mod json;
pub mod retry;
mod wire;

pub use client::OpenAiCompatibleClient;
pub use json::{extract_json, extract_json_array};
pub use retry::{RetryPolicy, RetryingModel};
