//! Stage 2: structural validation. A citation must name an existing,
//! in-range span inside the repository.

use std::collections::BTreeMap;
use std::path::Path;

use docweave_core::errors::CitationError;
use docweave_core::models::{Citation, CitationVerdict, ClaimType, Severity};
use docweave_ingest::scanner::normalize_relative;
use docweave_storage::StoreEngine;
use tracing::debug;

/// The source text a citation points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub text: String,
    pub total_lines: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedSpan),
    Unresolved(CitationVerdict),
}

/// Resolves spans against the store first, then the working tree.
pub struct SpanResolver<'a> {
    store: &'a StoreEngine,
    root: &'a Path,
}

impl<'a> SpanResolver<'a> {
    pub fn new(store: &'a StoreEngine, root: &'a Path) -> Self {
        Self { store, root }
    }

    fn from_store(
        &self,
        path: &str,
        start: u32,
        end: u32,
    ) -> Result<Option<Result<ResolvedSpan, String>>, CitationError> {
        let Some(row) = self.store.get_file(path)? else {
            return Ok(None);
        };
        if !self.root.join(path).is_file() {
            return Ok(Some(Err(format!(
                "{path} no longer exists in the working tree (deleted or renamed)"
            ))));
        }
        if end > row.line_count {
            return Ok(Some(Err(out_of_range(start, end, row.line_count))));
        }

        let mut lines: BTreeMap<u32, &str> = BTreeMap::new();
        let chunks = self.store.get_chunks_overlapping(path, start, end)?;
        for chunk in &chunks {
            for (i, line) in chunk.text.lines().enumerate() {
                let number = chunk.start_line + i as u32;
                if (start..=end).contains(&number) {
                    lines.entry(number).or_insert(line);
                }
            }
        }
        if lines.is_empty() {
            // Blank gap between chunks; the working tree still has it.
            return Ok(None);
        }
        Ok(Some(Ok(ResolvedSpan {
            path: path.to_string(),
            start_line: start,
            end_line: end,
            text: lines.into_values().collect::<Vec<_>>().join("\n"),
            total_lines: row.line_count,
        })))
    }

    fn from_filesystem(&self, path: &str, start: u32, end: u32) -> Result<ResolvedSpan, String> {
        let absolute = self.root.join(path);
        if !absolute.is_file() {
            return Err(format!("file not found: {path}"));
        }
        let content = std::fs::read_to_string(&absolute)
            .map_err(|e| format!("unreadable file {path}: {e}"))?;
        let total = content.lines().count() as u32;
        if end > total {
            return Err(out_of_range(start, end, total));
        }
        let text = content
            .lines()
            .skip((start - 1) as usize)
            .take((end - start + 1) as usize)
            .collect::<Vec<_>>()
            .join("\n");
        Ok(ResolvedSpan {
            path: path.to_string(),
            start_line: start,
            end_line: end,
            text,
            total_lines: total,
        })
    }
}

fn out_of_range(start: u32, end: u32, total: u32) -> String {
    format!("lines {start}-{end} out of range (file has {total} lines)")
}

/// Resolve a citation or produce an `invalid`/`major` verdict explaining
/// why it cannot be resolved. Only store failures are errors.
pub fn validate_structure(
    citation: &Citation,
    resolver: &SpanResolver<'_>,
) -> Result<Resolution, CitationError> {
    let unresolved = |reason: String| -> Result<Resolution, CitationError> {
        debug!(citation = %citation, %reason, "citation unresolved");
        Ok(Resolution::Unresolved(CitationVerdict::invalid(
            citation.id,
            ClaimType::Extractive,
            Severity::Major,
            reason,
        )))
    };

    if citation.start_line == 0 {
        return unresolved("line numbers start at 1".to_string());
    }
    if citation.start_line > citation.end_line {
        return unresolved(format!(
            "start line {} is after end line {}",
            citation.start_line, citation.end_line
        ));
    }
    let Some(path) = normalize_relative(&citation.path).filter(|p| !p.is_empty()) else {
        return unresolved(format!("{} is outside the repository", citation.path));
    };

    let (start, end) = (citation.start_line, citation.end_line);
    let outcome = match resolver.from_store(&path, start, end)? {
        Some(outcome) => outcome,
        None => resolver.from_filesystem(&path, start, end),
    };
    match outcome {
        Ok(span) => Ok(Resolution::Resolved(span)),
        Err(reason) => unresolved(reason),
    }
}
