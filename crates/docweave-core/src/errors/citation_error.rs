use super::error_code::{self, DocweaveErrorCode};
use super::{RetrievalError, StorageError};

/// Citation pipeline errors. Unresolvable citations and judge failures are
/// verdicts, not errors; this covers infrastructure failures only.
#[derive(Debug, thiserror::Error)]
pub enum CitationError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("invalid citation pattern: {reason}")]
    Pattern { reason: String },
}

impl DocweaveErrorCode for CitationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Retrieval(e) => e.error_code(),
            Self::Pattern { .. } => error_code::CITATION_ERROR,
        }
    }
}
