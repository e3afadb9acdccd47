use super::error_code::{self, DocweaveErrorCode};
use super::StorageError;

/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("search failed: {reason}")]
    SearchFailed { reason: String },

    #[error("ranking failed: {reason}")]
    RankingFailed { reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl DocweaveErrorCode for RetrievalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SearchFailed { .. } | Self::RankingFailed { .. } => error_code::RETRIEVAL_ERROR,
            Self::Storage(e) => e.error_code(),
        }
    }
}
