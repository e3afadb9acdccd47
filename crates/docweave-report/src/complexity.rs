//! Size-proportional budgets: the ingested symbol count picks a bucket
//! whose budgets replace the ones the user left unset.

use docweave_core::config::{BudgetConfig, Budgets};
use docweave_storage::StoreStats;
use serde::Serialize;

const SIMPLE_MAX_SYMBOLS: usize = 5_000;
const MEDIUM_MAX_SYMBOLS: usize = 25_000;
const LARGE_MAX_SYMBOLS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityBucket {
    Simple,
    Medium,
    Large,
    Complex,
}

impl ComplexityBucket {
    pub fn from_symbol_count(symbols: usize) -> Self {
        if symbols <= SIMPLE_MAX_SYMBOLS {
            Self::Simple
        } else if symbols <= MEDIUM_MAX_SYMBOLS {
            Self::Medium
        } else if symbols <= LARGE_MAX_SYMBOLS {
            Self::Large
        } else {
            Self::Complex
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Complex => "complex",
        }
    }

    pub fn max_sections(&self) -> u32 {
        match self {
            Self::Simple => 10,
            Self::Medium => 25,
            Self::Large => 40,
            Self::Complex => 50,
        }
    }

    pub fn max_exploration_steps(&self) -> u32 {
        match self {
            Self::Simple => 100,
            Self::Medium => 300,
            Self::Large => 500,
            Self::Complex => 800,
        }
    }

    pub fn max_section_steps(&self) -> u32 {
        match self {
            Self::Simple => 15,
            Self::Medium => 20,
            Self::Large => 25,
            Self::Complex => 30,
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Simple => "Small, focused codebase. Cover every major component in depth.",
            Self::Medium => {
                "Medium codebase. Concentrate on architecture and the key modules; summarize peripheral code."
            }
            Self::Large => {
                "Large codebase. Prioritize the core systems and the most intricate code; keep stable, simple areas to short summaries."
            }
            Self::Complex => {
                "Very large codebase. Full coverage is out of reach: focus on architecture, entry points and what a newcomer needs to find their way."
            }
        }
    }
}

/// Store size and the bucket it falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplexityAnalysis {
    pub files: usize,
    pub chunks: usize,
    pub symbols: usize,
    pub bucket: ComplexityBucket,
}

impl ComplexityAnalysis {
    pub fn from_stats(stats: &StoreStats) -> Self {
        Self {
            files: stats.files,
            chunks: stats.chunks,
            symbols: stats.symbols,
            bucket: ComplexityBucket::from_symbol_count(stats.symbols),
        }
    }

    /// Bucket budgets for every field `explicit` leaves unset; fields the
    /// user set keep the value already in `budgets`.
    pub fn apply(&self, budgets: Budgets, explicit: &BudgetConfig) -> Budgets {
        Budgets {
            max_sections: explicit
                .max_sections
                .map_or(self.bucket.max_sections(), |_| budgets.max_sections),
            max_exploration_steps: explicit
                .max_exploration_steps
                .map_or(self.bucket.max_exploration_steps(), |_| {
                    budgets.max_exploration_steps
                }),
            max_section_steps: explicit
                .max_section_steps
                .map_or(self.bucket.max_section_steps(), |_| budgets.max_section_steps),
            ..budgets
        }
    }

    /// Appended to the exploration task so the model scales its depth.
    pub fn prompt_context(&self, budgets: &Budgets) -> String {
        format!(
            "## Codebase size\n\nThis is a **{}** codebase ({} files, {} symbols).\n\nDocumentation strategy: {}\n\nPlan for at most {} sections.",
            self.bucket.as_str(),
            self.files,
            self.symbols,
            self.bucket.guidance(),
            budgets.max_sections
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(symbols: usize) -> ComplexityAnalysis {
        ComplexityAnalysis::from_stats(&StoreStats {
            files: 3,
            chunks: 9,
            symbols,
            edges: 0,
        })
    }

    #[test]
    fn bucket_boundaries_are_inclusive() {
        assert_eq!(ComplexityBucket::from_symbol_count(0), ComplexityBucket::Simple);
        assert_eq!(ComplexityBucket::from_symbol_count(5_000), ComplexityBucket::Simple);
        assert_eq!(ComplexityBucket::from_symbol_count(5_001), ComplexityBucket::Medium);
        assert_eq!(ComplexityBucket::from_symbol_count(25_000), ComplexityBucket::Medium);
        assert_eq!(ComplexityBucket::from_symbol_count(100_000), ComplexityBucket::Large);
        assert_eq!(ComplexityBucket::from_symbol_count(100_001), ComplexityBucket::Complex);
    }

    #[test]
    fn unset_budgets_take_bucket_values() {
        let budgets = analysis(30_000).apply(Budgets::default(), &BudgetConfig::default());
        assert_eq!(budgets.max_sections, 40);
        assert_eq!(budgets.max_exploration_steps, 500);
        assert_eq!(budgets.max_section_steps, 25);
        assert_eq!(budgets.max_correction_iterations, Budgets::default().max_correction_iterations);
    }

    #[test]
    fn explicit_budgets_win() {
        let explicit = BudgetConfig {
            max_sections: Some(3),
            ..BudgetConfig::default()
        };
        let start = Budgets {
            max_sections: 3,
            ..Budgets::default()
        };
        let budgets = analysis(10).apply(start, &explicit);
        assert_eq!(budgets.max_sections, 3);
        assert_eq!(budgets.max_exploration_steps, 100);
    }

    #[test]
    fn context_names_bucket_and_strategy() {
        let a = analysis(12);
        let text = a.prompt_context(&Budgets::default());
        assert!(text.contains("**simple**"));
        assert!(text.contains("12 symbols"));
        assert!(text.contains(ComplexityBucket::Simple.guidance()));
    }
}
