//! Configuration system for docweave.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.
//! `RunConfig` is the resolved, immutable form threaded through a run.

pub mod budget_config;
pub mod citation_config;
pub mod defaults;
pub mod docweave_config;
pub mod embedding_config;
pub mod execution_config;
pub mod gate_config;
pub mod ingest_config;
pub mod llm_config;
pub mod retrieval_config;
pub mod run_config;

pub use budget_config::BudgetConfig;
pub use citation_config::CitationConfig;
pub use docweave_config::{CliOverrides, DocweaveConfig};
pub use embedding_config::{EmbeddingConfig, EmbeddingProviderKind};
pub use execution_config::ExecutionConfig;
pub use gate_config::GateConfig;
pub use ingest_config::IngestConfig;
pub use llm_config::LlmConfig;
pub use retrieval_config::RetrievalConfig;
pub use run_config::{Budgets, CitationSettings, GateThresholds, LlmSettings, RankWeights, RunConfig};
