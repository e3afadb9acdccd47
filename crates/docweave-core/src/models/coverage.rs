use serde::{Deserialize, Serialize};

/// Share of a section's scoped symbols that its citations reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub section_id: usize,
    pub symbols_referenced: usize,
    pub symbols_total: usize,
    /// Always in `[0, 1]`. An empty scope counts as fully covered.
    pub coverage_ratio: f64,
}

impl CoverageReport {
    pub fn new(section_id: usize, symbols_referenced: usize, symbols_total: usize) -> Self {
        let coverage_ratio = if symbols_total == 0 {
            1.0
        } else {
            (symbols_referenced.min(symbols_total) as f64 / symbols_total as f64).clamp(0.0, 1.0)
        };
        Self {
            section_id,
            symbols_referenced,
            symbols_total,
            coverage_ratio,
        }
    }
}
