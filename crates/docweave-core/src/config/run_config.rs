//! Resolved, immutable run configuration.

use std::time::Duration;

use serde::Serialize;

use super::defaults;
use super::DocweaveConfig;

/// Step and iteration budgets for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Budgets {
    pub max_exploration_steps: u32,
    pub max_sections: u32,
    pub max_section_steps: u32,
    pub max_correction_iterations: u32,
    pub max_uncited_retries: u32,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            max_exploration_steps: defaults::DEFAULT_MAX_EXPLORATION_STEPS,
            max_sections: defaults::DEFAULT_MAX_SECTIONS,
            max_section_steps: defaults::DEFAULT_MAX_SECTION_STEPS,
            max_correction_iterations: defaults::DEFAULT_MAX_CORRECTION_ITERATIONS,
            max_uncited_retries: defaults::DEFAULT_MAX_UNCITED_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateThresholds {
    pub coverage: f64,
    pub validity: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            coverage: defaults::DEFAULT_COVERAGE_THRESHOLD,
            validity: defaults::DEFAULT_VALIDITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CitationSettings {
    pub extractive_threshold: f64,
    pub keyword_threshold: f64,
    pub judge_batch_size: usize,
}

impl Default for CitationSettings {
    fn default() -> Self {
        Self {
            extractive_threshold: defaults::DEFAULT_EXTRACTIVE_THRESHOLD,
            keyword_threshold: defaults::DEFAULT_KEYWORD_THRESHOLD,
            judge_batch_size: defaults::DEFAULT_JUDGE_BATCH_SIZE,
        }
    }
}

/// Hybrid ranking weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankWeights {
    pub lexical: f64,
    pub graph: f64,
    pub embedding: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            lexical: defaults::DEFAULT_LEXICAL_WEIGHT,
            graph: defaults::DEFAULT_GRAPH_WEIGHT,
            embedding: defaults::DEFAULT_EMBEDDING_WEIGHT,
        }
    }
}

impl RankWeights {
    /// Weights with the embedding share folded into lexical and graph
    /// proportionally, for ranking without an embedding provider.
    pub fn without_embedding(&self) -> Self {
        let base = self.lexical + self.graph;
        if base <= f64::EPSILON {
            return Self {
                lexical: 1.0,
                graph: 0.0,
                embedding: 0.0,
            };
        }
        let scale = (base + self.embedding) / base;
        Self {
            lexical: self.lexical * scale,
            graph: self.graph * scale,
            embedding: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmSettings {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
            api_key_env: defaults::DEFAULT_API_KEY_ENV.to_string(),
            timeout: Duration::from_secs(defaults::DEFAULT_LLM_TIMEOUT_SECS),
            max_retries: defaults::DEFAULT_LLM_MAX_RETRIES,
            initial_backoff: Duration::from_millis(defaults::DEFAULT_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(defaults::DEFAULT_MAX_BACKOFF_MS),
        }
    }
}

/// Everything a run needs, resolved once and passed by reference to every
/// component. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub budgets: Budgets,
    pub gates: GateThresholds,
    pub citations: CitationSettings,
    pub weights: RankWeights,
    pub search_limit: usize,
    pub llm: LlmSettings,
    pub max_concurrency: usize,
    pub wall_clock: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from_config(&DocweaveConfig::default())
    }
}

impl RunConfig {
    pub fn from_config(config: &DocweaveConfig) -> Self {
        Self {
            budgets: Budgets {
                max_exploration_steps: config.budgets.effective_max_exploration_steps(),
                max_sections: config.budgets.effective_max_sections(),
                max_section_steps: config.budgets.effective_max_section_steps(),
                max_correction_iterations: config.budgets.effective_max_correction_iterations(),
                max_uncited_retries: config.budgets.effective_max_uncited_retries(),
            },
            gates: GateThresholds {
                coverage: config.gates.effective_coverage_threshold(),
                validity: config.gates.effective_validity_threshold(),
            },
            citations: CitationSettings {
                extractive_threshold: config.citations.effective_extractive_threshold(),
                keyword_threshold: config.citations.effective_keyword_threshold(),
                judge_batch_size: config.citations.effective_judge_batch_size(),
            },
            weights: RankWeights {
                lexical: config.retrieval.effective_lexical_weight(),
                graph: config.retrieval.effective_graph_weight(),
                embedding: config.retrieval.effective_embedding_weight(),
            },
            search_limit: config.retrieval.effective_search_limit(),
            llm: LlmSettings {
                model: config.llm.effective_model(),
                base_url: config.llm.effective_base_url(),
                api_key_env: config.llm.effective_api_key_env(),
                timeout: Duration::from_secs(config.llm.effective_timeout_secs()),
                max_retries: config.llm.effective_max_retries(),
                initial_backoff: Duration::from_millis(config.llm.effective_initial_backoff_ms()),
                max_backoff: Duration::from_millis(config.llm.effective_max_backoff_ms()),
            },
            max_concurrency: config.execution.effective_max_concurrency(),
            wall_clock: config.execution.wall_clock_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_embedding_preserves_total_weight() {
        let w = RankWeights::default().without_embedding();
        let total = w.lexical + w.graph + w.embedding;
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(w.embedding, 0.0);
        assert!(w.lexical > w.graph);
    }

    #[test]
    fn default_resolution_matches_defaults() {
        let run = DocweaveConfig::default().resolve();
        assert_eq!(run.budgets, Budgets::default());
        assert_eq!(run.search_limit, defaults::DEFAULT_SEARCH_LIMIT);
        assert!(run.wall_clock.is_none());
    }
}
