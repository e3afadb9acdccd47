use super::error_code::{self, DocweaveErrorCode};
use super::{LlmError, StorageError};

/// Agent loop errors. Tool failures are observations, not errors;
/// only external-call exhaustion and cancellation end a loop early.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("model error: {0}")]
    Llm(#[from] LlmError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("agent loop cancelled")]
    Cancelled,
}

impl DocweaveErrorCode for AgentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Llm(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
