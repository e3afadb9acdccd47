//! Concurrency and wall-clock limits.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Sections drafted and verified concurrently. Default: 4.
    pub max_concurrency: Option<usize>,
    /// Cancel the run after this many seconds. Default: unlimited.
    pub wall_clock_secs: Option<u64>,
}

impl ExecutionConfig {
    pub fn effective_max_concurrency(&self) -> usize {
        self.max_concurrency
            .unwrap_or(defaults::DEFAULT_MAX_CONCURRENCY)
    }

    pub(crate) fn merge_from(&mut self, other: &ExecutionConfig) {
        if other.max_concurrency.is_some() {
            self.max_concurrency = other.max_concurrency;
        }
        if other.wall_clock_secs.is_some() {
            self.wall_clock_secs = other.wall_clock_secs;
        }
    }
}
