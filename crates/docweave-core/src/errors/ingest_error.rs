use super::error_code::{self, DocweaveErrorCode};

/// Ingestion errors. Per-file problems become skip records instead;
/// only root-level failures surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("repository root not found: {path}")]
    RootNotFound { path: String },

    #[error("repository root is not a directory: {path}")]
    RootNotDirectory { path: String },

    #[error("walk failed: {reason}")]
    WalkFailed { reason: String },

    #[error("chunking failed for {path}: {reason}")]
    ChunkFailed { path: String, reason: String },

    #[error("clone of {url} failed: {reason}")]
    CloneFailed { url: String, reason: String },
}

impl DocweaveErrorCode for IngestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RootNotFound { .. } | Self::RootNotDirectory { .. } => {
                error_code::INVALID_INPUT
            }
            Self::WalkFailed { .. } | Self::ChunkFailed { .. } => error_code::INGEST_ERROR,
            Self::CloneFailed { .. } => error_code::CLONE_FAILED,
        }
    }
}
