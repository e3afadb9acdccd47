//! The JSON sidecar written next to every report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use docweave_core::models::{DegradationEvent, SectionStatus, Severity, VerdictStatus};
use docweave_ingest::IngestReport;
use serde::Serialize;
use tracing::info;

use crate::runner::RunReport;

pub const METADATA_VERSION: &str = "1.0";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where a run came from and where its report went.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub model: String,
    pub repo: String,
    pub prompt_file: String,
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidCitation {
    pub section: String,
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub status: VerdictStatus,
    pub severity: Severity,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CitationTotals {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub unverifiable: usize,
    pub invalid_list: Vec<InvalidCitation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionMetadata {
    pub title: String,
    pub status: SectionStatus,
    pub coverage: f64,
    pub validity_rate: f64,
    pub iterations: u32,
    pub deficiencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub version: String,
    pub model: String,
    pub repo: String,
    pub prompt_file: String,
    pub generated_at: DateTime<Utc>,
    pub output_file: String,
    pub citations: CitationTotals,
    pub severity: BTreeMap<String, usize>,
    pub coverage: f64,
    pub validity_rate: f64,
    pub sections: Vec<SectionMetadata>,
    pub unresolved_issues: Vec<String>,
    pub degradation_events: Vec<DegradationEvent>,
    pub ingest: IngestReport,
    pub cancelled: bool,
}

impl ReportMetadata {
    pub fn from_run(report: &RunReport, context: &RunContext) -> Self {
        let invalid_list = report
            .sections
            .iter()
            .filter_map(|o| o.verification.as_ref().map(|v| (o, v)))
            .flat_map(|(o, v)| {
                v.failures().into_iter().map(move |(citation, verdict)| InvalidCitation {
                    section: o.section.title.clone(),
                    path: citation.path.clone(),
                    start_line: citation.start_line,
                    end_line: citation.end_line,
                    status: verdict.status,
                    severity: verdict.severity,
                    reason: verdict.reason.clone(),
                })
            })
            .collect();

        let sections = report
            .sections
            .iter()
            .map(|o| SectionMetadata {
                title: o.section.title.clone(),
                status: o.section.status,
                coverage: o.coverage_ratio(),
                validity_rate: o.validity_rate(),
                iterations: o.iterations,
                deficiencies: o.deficiencies.clone(),
            })
            .collect();

        Self {
            version: METADATA_VERSION.to_string(),
            model: context.model.clone(),
            repo: context.repo.clone(),
            prompt_file: context.prompt_file.clone(),
            generated_at: Utc::now(),
            output_file: context.output_file.display().to_string(),
            citations: CitationTotals {
                total: report.summary.total,
                valid: report.summary.valid,
                invalid: report.summary.invalid,
                unverifiable: report.summary.unverifiable,
                invalid_list,
            },
            severity: report
                .summary
                .severity
                .iter()
                .map(|(s, n)| (s.as_str().to_string(), *n))
                .collect(),
            coverage: report.coverage_ratio(),
            validity_rate: report.summary.validity_rate,
            sections,
            unresolved_issues: report.unresolved_issues(),
            degradation_events: report.degradation_events.clone(),
            ingest: report.ingest.clone(),
            cancelled: report.cancelled,
        }
    }
}

/// `<dir>/<stem>.metadata.json` for a report at `<dir>/<stem>.<ext>`.
pub fn sidecar_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output.with_file_name(format!("{stem}.metadata.json"))
}

/// Write the markdown report and its sidecar side by side. Returns the
/// sidecar path.
pub fn write_report(report: &RunReport, context: &RunContext) -> Result<PathBuf, ReportError> {
    let output = &context.output_file;
    let write_err = |path: &Path, source: std::io::Error| ReportError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }
    std::fs::write(output, &report.markdown).map_err(|e| write_err(output, e))?;

    let sidecar = sidecar_path(output);
    let metadata = ReportMetadata::from_run(report, context);
    let json = serde_json::to_string_pretty(&metadata)?;
    std::fs::write(&sidecar, json).map_err(|e| write_err(&sidecar, e))?;
    info!(
        report = %output.display(),
        metadata = %sidecar.display(),
        "report written"
    );
    Ok(sidecar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_sits_next_to_report() {
        assert_eq!(
            sidecar_path(Path::new("out/guide.md")),
            PathBuf::from("out/guide.metadata.json")
        );
        assert_eq!(
            sidecar_path(Path::new("report")),
            PathBuf::from("report.metadata.json")
        );
    }
}
