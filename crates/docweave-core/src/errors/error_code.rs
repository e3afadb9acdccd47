//! Stable error codes surfaced in logs and the metadata sidecar.

/// Maps an error to a stable, machine-readable code.
pub trait DocweaveErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const INGEST_ERROR: &str = "INGEST_ERROR";
pub const CLONE_FAILED: &str = "CLONE_FAILED";
pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const RETRIEVAL_ERROR: &str = "RETRIEVAL_ERROR";
pub const EMBEDDING_ERROR: &str = "EMBEDDING_ERROR";
pub const EXTERNAL_CALL_FAILED: &str = "EXTERNAL_CALL_FAILED";
pub const CITATION_ERROR: &str = "CITATION_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CANCELLED: &str = "CANCELLED";
