use super::error_code::{self, DocweaveErrorCode};

/// Language-model capability errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("request timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("rate limited by provider (status {status})")]
    RateLimited { status: u16 },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("missing API key: set {var}")]
    MissingApiKey { var: String },

    #[error("gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("model call cancelled")]
    Cancelled,
}

impl LlmError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl DocweaveErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            Self::MissingApiKey { .. } => error_code::CONFIG_ERROR,
            _ => error_code::EXTERNAL_CALL_FAILED,
        }
    }
}
