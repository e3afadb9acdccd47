//! Section gate thresholds.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Both thresholds must be met for a section to pass.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum coverage ratio. Default: 0.80.
    pub coverage_threshold: Option<f64>,
    /// Minimum citation validity rate. Default: 0.80.
    pub validity_threshold: Option<f64>,
}

impl GateConfig {
    pub fn effective_coverage_threshold(&self) -> f64 {
        self.coverage_threshold
            .unwrap_or(defaults::DEFAULT_COVERAGE_THRESHOLD)
    }

    pub fn effective_validity_threshold(&self) -> f64 {
        self.validity_threshold
            .unwrap_or(defaults::DEFAULT_VALIDITY_THRESHOLD)
    }

    pub(crate) fn merge_from(&mut self, other: &GateConfig) {
        if other.coverage_threshold.is_some() {
            self.coverage_threshold = other.coverage_threshold;
        }
        if other.validity_threshold.is_some() {
            self.validity_threshold = other.validity_threshold;
        }
    }
}
