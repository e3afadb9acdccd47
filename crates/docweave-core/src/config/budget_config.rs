//! Run-wide step and iteration budgets.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BudgetConfig {
    /// Model turns allowed for whole-repo exploration. Default: 50.
    pub max_exploration_steps: Option<u32>,
    /// Outline length cap. Default: 20.
    pub max_sections: Option<u32>,
    /// Model turns allowed per section sub-loop. Default: 5.
    pub max_section_steps: Option<u32>,
    /// Regenerations per failing section. Default: 2.
    pub max_correction_iterations: Option<u32>,
    /// Re-prompts for drafts with uncited claims. Default: 1.
    pub max_uncited_retries: Option<u32>,
}

impl BudgetConfig {
    pub fn effective_max_exploration_steps(&self) -> u32 {
        self.max_exploration_steps
            .unwrap_or(defaults::DEFAULT_MAX_EXPLORATION_STEPS)
    }

    pub fn effective_max_sections(&self) -> u32 {
        self.max_sections.unwrap_or(defaults::DEFAULT_MAX_SECTIONS)
    }

    pub fn effective_max_section_steps(&self) -> u32 {
        self.max_section_steps
            .unwrap_or(defaults::DEFAULT_MAX_SECTION_STEPS)
    }

    pub fn effective_max_correction_iterations(&self) -> u32 {
        self.max_correction_iterations
            .unwrap_or(defaults::DEFAULT_MAX_CORRECTION_ITERATIONS)
    }

    pub fn effective_max_uncited_retries(&self) -> u32 {
        self.max_uncited_retries
            .unwrap_or(defaults::DEFAULT_MAX_UNCITED_RETRIES)
    }

    pub(crate) fn merge_from(&mut self, other: &BudgetConfig) {
        if other.max_exploration_steps.is_some() {
            self.max_exploration_steps = other.max_exploration_steps;
        }
        if other.max_sections.is_some() {
            self.max_sections = other.max_sections;
        }
        if other.max_section_steps.is_some() {
            self.max_section_steps = other.max_section_steps;
        }
        if other.max_correction_iterations.is_some() {
            self.max_correction_iterations = other.max_correction_iterations;
        }
        if other.max_uncited_retries.is_some() {
            self.max_uncited_retries = other.max_uncited_retries;
        }
    }
}
