//! Error handling for docweave.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod agent_error;
pub mod citation_error;
pub mod config_error;
pub mod embedding_error;
pub mod error_code;
pub mod ingest_error;
pub mod llm_error;
pub mod pipeline_error;
pub mod retrieval_error;
pub mod storage_error;

pub use agent_error::AgentError;
pub use citation_error::CitationError;
pub use config_error::ConfigError;
pub use embedding_error::EmbeddingError;
pub use error_code::DocweaveErrorCode;
pub use ingest_error::IngestError;
pub use llm_error::LlmError;
pub use pipeline_error::PipelineError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
