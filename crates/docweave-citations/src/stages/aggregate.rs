//! Stage 7: validity rate, status counts, and severity histogram.

use std::collections::BTreeMap;

use docweave_core::models::{CitationVerdict, Severity, VerdictStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub unverifiable: usize,
    /// `valid / total`; a section without citations has nothing invalid
    /// and rates 1.0.
    pub validity_rate: f64,
    /// Decided verdicts by severity; unverifiable ones are counted apart.
    pub severity: BTreeMap<Severity, usize>,
}

impl Default for VerificationSummary {
    fn default() -> Self {
        Self {
            total: 0,
            valid: 0,
            invalid: 0,
            unverifiable: 0,
            validity_rate: 1.0,
            severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
        }
    }
}

impl VerificationSummary {
    /// Fold another summary in, for per-report totals.
    pub fn merge(&mut self, other: &VerificationSummary) {
        self.total += other.total;
        self.valid += other.valid;
        self.invalid += other.invalid;
        self.unverifiable += other.unverifiable;
        for (severity, count) in &other.severity {
            *self.severity.entry(*severity).or_insert(0) += count;
        }
        self.validity_rate = rate(self.valid, self.total);
    }
}

fn rate(valid: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        valid as f64 / total as f64
    }
}

pub fn aggregate(verdicts: &[CitationVerdict]) -> VerificationSummary {
    let mut summary = VerificationSummary::default();
    for verdict in verdicts {
        summary.total += 1;
        match verdict.status {
            VerdictStatus::Valid => summary.valid += 1,
            VerdictStatus::Invalid => summary.invalid += 1,
            VerdictStatus::Unverifiable => {
                summary.unverifiable += 1;
                continue;
            }
        }
        *summary.severity.entry(verdict.severity).or_insert(0) += 1;
    }
    summary.validity_rate = rate(summary.valid, summary.total);
    summary
}
