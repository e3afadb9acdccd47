use super::error_code::{self, DocweaveErrorCode};

/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("record not found: {what}")]
    NotFound { what: String },

    #[error("serialization failed: {reason}")]
    Serialization { reason: String },
}

impl DocweaveErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SqliteError { .. } => error_code::STORAGE_ERROR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Serialization { .. } => error_code::STORAGE_ERROR,
        }
    }
}
