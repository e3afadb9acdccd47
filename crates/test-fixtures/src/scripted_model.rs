use std::collections::VecDeque;
use std::sync::Mutex;

use docweave_core::errors::LlmError;
use docweave_core::models::{ChatRequest, ChatResponse};
use docweave_core::traits::ILanguageModel;

type Responder = Box<dyn Fn(&ChatRequest) -> Result<ChatResponse, LlmError> + Send + Sync>;

/// A language model that replays queued responses and records every
/// request it sees.
///
/// With a responder installed, an empty queue falls through to it;
/// otherwise an empty queue yields `LlmError::RequestFailed`.
pub struct ScriptedModel {
    queue: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<ChatRequest>>,
    name: String,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            responder: None,
            requests: Mutex::new(Vec::new()),
            name: "scripted".to_string(),
        }
    }

    /// Answer every request by calling `f`. Useful when requests arrive
    /// from several threads in no fixed order.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<ChatResponse, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(f)),
            ..Self::new()
        }
    }

    pub fn then_text(self, text: &str) -> Self {
        self.push(Ok(ChatResponse::text(text)));
        self
    }

    pub fn then_tool(self, name: &str, arguments: serde_json::Value) -> Self {
        self.push(Ok(ChatResponse::tool_call(name, arguments)));
        self
    }

    pub fn then_error(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn push(&self, response: Result<ChatResponse, LlmError>) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ILanguageModel for ScriptedModel {
    fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let queued = self
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match (queued, &self.responder) {
            (Some(response), _) => response,
            (None, Some(responder)) => responder(request),
            (None, None) => Err(LlmError::RequestFailed {
                reason: "scripted model has no responses left".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}
