//! Errors that end a pipeline run.

use super::error_code::{self, DocweaveErrorCode};
use super::{
    AgentError, CitationError, ConfigError, EmbeddingError, IngestError, LlmError,
    RetrievalError, StorageError,
};

/// Errors that can end a pipeline run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Citation error: {0}")]
    Citation(#[from] CitationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input {path}: {reason}")]
    InvalidInput { path: String, reason: String },

    #[error("Pipeline cancelled")]
    Cancelled,
}

impl PipelineError {
    /// True for failures caused by bad user input rather than a dependency.
    pub fn is_input_error(&self) -> bool {
        self.error_code() == error_code::INVALID_INPUT
            || self.error_code() == error_code::CONFIG_ERROR
    }
}

impl DocweaveErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Ingest(e) => e.error_code(),
            Self::Retrieval(e) => e.error_code(),
            Self::Embedding(e) => e.error_code(),
            Self::Llm(e) => e.error_code(),
            Self::Agent(e) => e.error_code(),
            Self::Citation(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::InvalidInput { .. } => error_code::INVALID_INPUT,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_propagate_through_wrappers() {
        let err: PipelineError = AgentError::Llm(LlmError::Timeout { after_secs: 5 }).into();
        assert_eq!(err.error_code(), error_code::EXTERNAL_CALL_FAILED);
        assert!(!err.is_input_error());
    }

    #[test]
    fn missing_root_is_input_error() {
        let err: PipelineError = IngestError::RootNotFound {
            path: "/nope".to_string(),
        }
        .into();
        assert!(err.is_input_error());
    }
}
