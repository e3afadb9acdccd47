//! Coverage AND validity gate over one verified section.

use docweave_citations::SectionVerification;
use docweave_core::config::GateThresholds;
use serde::Serialize;

/// Result of gating one section draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateResult {
    pub passed: bool,
    pub coverage_passed: bool,
    pub validity_passed: bool,
    pub coverage_ratio: f64,
    /// `valid / total`; `unverifiable` verdicts count against it.
    pub validity_rate: f64,
}

impl GateResult {
    /// One line per failed gate, for the deficiency list.
    pub fn reasons(&self, thresholds: &GateThresholds) -> Vec<String> {
        let mut reasons = Vec::new();
        if !self.coverage_passed {
            reasons.push(format!(
                "coverage {:.2} below threshold {:.2}",
                self.coverage_ratio, thresholds.coverage
            ));
        }
        if !self.validity_passed {
            reasons.push(format!(
                "validity {:.2} below threshold {:.2}",
                self.validity_rate, thresholds.validity
            ));
        }
        reasons
    }
}

/// Both gates are mandatory; there is no blended score.
pub fn evaluate(verification: &SectionVerification, thresholds: &GateThresholds) -> GateResult {
    let coverage_ratio = verification.coverage.coverage_ratio;
    let validity_rate = verification.summary.validity_rate;
    let coverage_passed = coverage_ratio >= thresholds.coverage;
    let validity_passed = validity_rate >= thresholds.validity;
    GateResult {
        passed: coverage_passed && validity_passed,
        coverage_passed,
        validity_passed,
        coverage_ratio,
        validity_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_citations::aggregate;
    use docweave_core::models::{CitationVerdict, ClaimType, CoverageReport, Severity};
    use proptest::prelude::*;

    fn verification(coverage: (usize, usize), verdicts: Vec<CitationVerdict>) -> SectionVerification {
        SectionVerification {
            section_id: 0,
            citations: Vec::new(),
            summary: aggregate(&verdicts),
            verdicts,
            coverage: CoverageReport::new(0, coverage.0, coverage.1),
            uncited: Vec::new(),
            uncovered: Vec::new(),
            judge_calls: 0,
        }
    }

    fn thresholds(coverage: f64, validity: f64) -> GateThresholds {
        GateThresholds { coverage, validity }
    }

    #[test]
    fn eight_of_ten_passes_at_threshold() {
        let v = verification((8, 10), vec![CitationVerdict::valid(0, ClaimType::Extractive, "ok")]);
        let gate = evaluate(&v, &thresholds(0.75, 0.8));
        assert!(gate.passed);
        assert!((gate.coverage_ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn high_coverage_does_not_rescue_validity() {
        let v = verification(
            (10, 10),
            vec![
                CitationVerdict::valid(0, ClaimType::Extractive, "ok"),
                CitationVerdict::invalid(1, ClaimType::Extractive, Severity::Major, "bad"),
            ],
        );
        let t = thresholds(0.8, 0.8);
        let gate = evaluate(&v, &t);
        assert!(gate.coverage_passed);
        assert!(!gate.validity_passed);
        assert!(!gate.passed);
        assert_eq!(gate.reasons(&t), vec!["validity 0.50 below threshold 0.80"]);
    }

    #[test]
    fn unverifiable_fails_validity() {
        let v = verification((1, 1), vec![CitationVerdict::unverifiable(0, "judge timed out")]);
        let gate = evaluate(&v, &thresholds(0.0, 0.5));
        assert!(!gate.validity_passed);
    }

    #[test]
    fn low_coverage_fails_alone() {
        let v = verification((1, 4), Vec::new());
        let t = thresholds(0.8, 0.8);
        let gate = evaluate(&v, &t);
        assert!(gate.validity_passed);
        assert!(!gate.passed);
        assert_eq!(gate.reasons(&t).len(), 1);
    }

    proptest! {
        #[test]
        fn passes_only_when_both_gates_pass(
            referenced in 0usize..20,
            extra in 0usize..20,
            valid in 0usize..10,
            invalid in 0usize..10,
            coverage in 0.0f64..=1.0,
            validity in 0.0f64..=1.0,
        ) {
            let mut verdicts: Vec<CitationVerdict> = (0..valid)
                .map(|i| CitationVerdict::valid(i, ClaimType::Extractive, "ok"))
                .collect();
            verdicts.extend((0..invalid).map(|i| {
                CitationVerdict::invalid(valid + i, ClaimType::Extractive, Severity::Minor, "bad")
            }));
            let v = verification((referenced, referenced + extra), verdicts);
            let t = thresholds(coverage, validity);
            let gate = evaluate(&v, &t);
            prop_assert_eq!(gate.passed, gate.coverage_passed && gate.validity_passed);
            prop_assert_eq!(gate.passed, gate.reasons(&t).is_empty());
        }
    }
}
