//! Top-level docweave configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    BudgetConfig, CitationConfig, EmbeddingConfig, ExecutionConfig, GateConfig, IngestConfig,
    LlmConfig, RetrievalConfig, RunConfig,
};
use crate::errors::ConfigError;

/// Project config file name, looked up in the repository root.
pub const PROJECT_CONFIG_FILE: &str = "docweave.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`DOCWEAVE_*`)
/// 3. Project config (`docweave.toml` in the repository root)
/// 4. User config (`~/.docweave/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocweaveConfig {
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
    pub budgets: BudgetConfig,
    pub gates: GateConfig,
    pub citations: CitationConfig,
    pub llm: LlmConfig,
    pub embeddings: EmbeddingConfig,
    pub execution: ExecutionConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_exploration_steps: Option<u32>,
    pub max_sections: Option<u32>,
    pub max_section_steps: Option<u32>,
    pub max_correction_iterations: Option<u32>,
    pub coverage_threshold: Option<f64>,
    pub validity_threshold: Option<f64>,
    pub max_concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl DocweaveConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => debug!(path = %user_config_path.display(), "merged user config"),
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
            debug!(path = %project_config_path.display(), "merged project config");
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &DocweaveConfig) -> Result<(), ConfigError> {
        let unit_interval = [
            ("gates.coverage_threshold", config.gates.coverage_threshold),
            ("gates.validity_threshold", config.gates.validity_threshold),
            ("citations.extractive_threshold", config.citations.extractive_threshold),
            ("citations.keyword_threshold", config.citations.keyword_threshold),
        ];
        for (field, value) in unit_interval {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::ValidationFailed {
                        field: field.to_string(),
                        message: "must be between 0.0 and 1.0".to_string(),
                    });
                }
            }
        }

        let weights = [
            ("retrieval.lexical_weight", config.retrieval.effective_lexical_weight()),
            ("retrieval.graph_weight", config.retrieval.effective_graph_weight()),
            ("retrieval.embedding_weight", config.retrieval.effective_embedding_weight()),
        ];
        for (field, w) in weights {
            if w < 0.0 || !w.is_finite() {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be a non-negative number".to_string(),
                });
            }
        }
        if weights.iter().all(|(_, w)| *w == 0.0) {
            return Err(ConfigError::ValidationFailed {
                field: "retrieval".to_string(),
                message: "at least one ranking weight must be positive".to_string(),
            });
        }

        let budgets = [
            ("budgets.max_exploration_steps", config.budgets.max_exploration_steps),
            ("budgets.max_sections", config.budgets.max_sections),
            ("budgets.max_section_steps", config.budgets.max_section_steps),
        ];
        for (field, value) in budgets {
            if value == Some(0) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if config.citations.judge_batch_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "citations.judge_batch_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.execution.max_concurrency == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "execution.max_concurrency".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.ingest.max_file_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "ingest.max_file_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve into the immutable object threaded through a run.
    pub fn resolve(&self) -> RunConfig {
        RunConfig::from_config(self)
    }

    /// Returns the user config path: `~/.docweave/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut DocweaveConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: DocweaveConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut DocweaveConfig, other: &DocweaveConfig) {
        base.ingest.merge_from(&other.ingest);
        base.retrieval.merge_from(&other.retrieval);
        base.budgets.merge_from(&other.budgets);
        base.gates.merge_from(&other.gates);
        base.citations.merge_from(&other.citations);
        base.llm.merge_from(&other.llm);
        base.embeddings.merge_from(&other.embeddings);
        base.execution.merge_from(&other.execution);
    }

    /// Apply environment variable overrides.
    /// Pattern: `DOCWEAVE_MODEL`, `DOCWEAVE_MAX_SECTIONS`, etc.
    fn apply_env_overrides(config: &mut DocweaveConfig) {
        if let Ok(val) = std::env::var("DOCWEAVE_MODEL") {
            config.llm.model = Some(val);
        }
        if let Ok(val) = std::env::var("DOCWEAVE_BASE_URL") {
            config.llm.base_url = Some(val);
        }
        if let Some(v) = env_parse::<u64>("DOCWEAVE_LLM_TIMEOUT_SECS") {
            config.llm.timeout_secs = Some(v);
        }
        if let Some(v) = env_parse::<u32>("DOCWEAVE_MAX_EXPLORATION_STEPS") {
            config.budgets.max_exploration_steps = Some(v);
        }
        if let Some(v) = env_parse::<u32>("DOCWEAVE_MAX_SECTIONS") {
            config.budgets.max_sections = Some(v);
        }
        if let Some(v) = env_parse::<u32>("DOCWEAVE_MAX_CORRECTION_ITERATIONS") {
            config.budgets.max_correction_iterations = Some(v);
        }
        if let Some(v) = env_parse::<f64>("DOCWEAVE_COVERAGE_THRESHOLD") {
            config.gates.coverage_threshold = Some(v);
        }
        if let Some(v) = env_parse::<f64>("DOCWEAVE_VALIDITY_THRESHOLD") {
            config.gates.validity_threshold = Some(v);
        }
        if let Some(v) = env_parse::<usize>("DOCWEAVE_MAX_CONCURRENCY") {
            config.execution.max_concurrency = Some(v);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut DocweaveConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.model {
            config.llm.model = Some(v.clone());
        }
        if let Some(ref v) = cli.base_url {
            config.llm.base_url = Some(v.clone());
        }
        if let Some(v) = cli.timeout_secs {
            config.llm.timeout_secs = Some(v);
        }
        if let Some(v) = cli.max_exploration_steps {
            config.budgets.max_exploration_steps = Some(v);
        }
        if let Some(v) = cli.max_sections {
            config.budgets.max_sections = Some(v);
        }
        if let Some(v) = cli.max_section_steps {
            config.budgets.max_section_steps = Some(v);
        }
        if let Some(v) = cli.max_correction_iterations {
            config.budgets.max_correction_iterations = Some(v);
        }
        if let Some(v) = cli.coverage_threshold {
            config.gates.coverage_threshold = Some(v);
        }
        if let Some(v) = cli.validity_threshold {
            config.gates.validity_threshold = Some(v);
        }
        if let Some(v) = cli.max_concurrency {
            config.execution.max_concurrency = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Returns the user-level config directory: `~/.docweave/`.
pub fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".docweave"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
