use crate::errors::LlmError;
use crate::models::{ChatRequest, ChatResponse};

/// Language-model capability: one chat completion per call.
///
/// Implementations are fallible and may be slow; callers wrap them with
/// retry and timeout policy rather than building it into each backend.
pub trait ILanguageModel: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Model identifier recorded in report metadata.
    fn model_name(&self) -> &str;
}

impl<T: ILanguageModel + ?Sized> ILanguageModel for Box<T> {
    fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        (**self).complete(request)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<T: ILanguageModel + ?Sized> ILanguageModel for std::sync::Arc<T> {
    fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        (**self).complete(request)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
