//! Citation verification tuning.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CitationConfig {
    /// Term-overlap ratio at or above which a claim is extractive. Default: 0.50.
    pub extractive_threshold: Option<f64>,
    /// Keyword match ratio an extractive claim needs to pass. Default: 0.60.
    pub keyword_threshold: Option<f64>,
    /// Abstractive claims per judge call. Default: 8.
    pub judge_batch_size: Option<usize>,
}

impl CitationConfig {
    pub fn effective_extractive_threshold(&self) -> f64 {
        self.extractive_threshold
            .unwrap_or(defaults::DEFAULT_EXTRACTIVE_THRESHOLD)
    }

    pub fn effective_keyword_threshold(&self) -> f64 {
        self.keyword_threshold
            .unwrap_or(defaults::DEFAULT_KEYWORD_THRESHOLD)
    }

    pub fn effective_judge_batch_size(&self) -> usize {
        self.judge_batch_size
            .unwrap_or(defaults::DEFAULT_JUDGE_BATCH_SIZE)
    }

    pub(crate) fn merge_from(&mut self, other: &CitationConfig) {
        if other.extractive_threshold.is_some() {
            self.extractive_threshold = other.extractive_threshold;
        }
        if other.keyword_threshold.is_some() {
            self.keyword_threshold = other.keyword_threshold;
        }
        if other.judge_batch_size.is_some() {
            self.judge_batch_size = other.judge_batch_size;
        }
    }
}
