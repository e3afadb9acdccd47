//! Stage 3: coverage of a section's scoped symbols by its citations.

use std::collections::BTreeSet;

use docweave_core::models::{Citation, CoverageReport, SymbolRecord};
use docweave_ingest::scanner::normalize_relative;

/// A scoped symbol is covered when some citation names its file and the
/// line ranges overlap. An empty scope is fully covered.
pub fn compute_coverage(
    section_id: usize,
    citations: &[Citation],
    scoped_symbols: &[SymbolRecord],
) -> CoverageReport {
    let cited = cited_ranges(citations);
    let mut total = BTreeSet::new();
    let mut covered = BTreeSet::new();
    for symbol in scoped_symbols {
        total.insert(symbol.id);
        if is_covered(&cited, symbol) {
            covered.insert(symbol.id);
        }
    }
    CoverageReport::new(section_id, covered.len(), total.len())
}

/// Names of scoped definitions no citation reaches, deduplicated, in
/// scope order.
pub fn uncovered_symbols(citations: &[Citation], scoped_symbols: &[SymbolRecord]) -> Vec<String> {
    let cited = cited_ranges(citations);
    let mut seen = BTreeSet::new();
    scoped_symbols
        .iter()
        .filter(|s| !is_covered(&cited, s))
        .map(|s| format!("{} ({})", s.name, s.file_path))
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

fn cited_ranges(citations: &[Citation]) -> Vec<(String, u32, u32)> {
    citations
        .iter()
        .filter_map(|c| {
            normalize_relative(&c.path).map(|path| (path, c.start_line, c.end_line))
        })
        .collect()
}

fn is_covered(cited: &[(String, u32, u32)], symbol: &SymbolRecord) -> bool {
    cited.iter().any(|(path, start, end)| {
        *path == symbol.file_path && *start <= symbol.end_line && symbol.start_line <= *end
    })
}
