//! Draft, verify, gate; regenerate failing sections against their
//! verdicts until the gates pass or the iteration budget runs out.

use std::collections::BTreeSet;

use docweave_agent::prompts;
use docweave_agent::{LoopState, SectionGenerator};
use docweave_citations::{CitationPipeline, SectionVerification};
use docweave_core::config::GateThresholds;
use docweave_core::models::{Section, SectionStatus};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::gate::{evaluate, GateResult};

/// A section after the correction loop, with everything the metadata
/// sidecar reports about it.
#[derive(Debug, Clone, Serialize)]
pub struct SectionOutcome {
    pub section: Section,
    /// Verification of the kept draft; absent when no draft was verified.
    pub verification: Option<SectionVerification>,
    pub gate: Option<GateResult>,
    /// Regenerations after the first draft.
    pub iterations: u32,
    pub deficiencies: Vec<String>,
    pub model_calls: u32,
    pub files_read: BTreeSet<String>,
    /// Set when an external call failed for good inside this section.
    pub external_failure: Option<String>,
    pub cancelled: bool,
}

impl SectionOutcome {
    /// A section the run never drafted because it was cancelled first.
    pub(crate) fn skipped(section: Section) -> Self {
        let mut outcome = Self::new(section);
        outcome.cancelled = true;
        outcome
            .deficiencies
            .push("run cancelled before the section was drafted".to_string());
        outcome
    }

    fn new(section: Section) -> Self {
        Self {
            section,
            verification: None,
            gate: None,
            iterations: 0,
            deficiencies: Vec::new(),
            model_calls: 0,
            files_read: BTreeSet::new(),
            external_failure: None,
            cancelled: false,
        }
    }

    pub fn passed(&self) -> bool {
        self.gate.as_ref().is_some_and(|g| g.passed)
    }

    pub fn coverage_ratio(&self) -> f64 {
        self.gate.as_ref().map_or(0.0, |g| g.coverage_ratio)
    }

    pub fn validity_rate(&self) -> f64 {
        self.gate.as_ref().map_or(0.0, |g| g.validity_rate)
    }
}

pub struct CorrectionLoop<'a> {
    generator: &'a SectionGenerator<'a>,
    verifier: &'a CitationPipeline<'a>,
    gates: GateThresholds,
    max_iterations: u32,
}

impl<'a> CorrectionLoop<'a> {
    pub fn new(
        generator: &'a SectionGenerator<'a>,
        verifier: &'a CitationPipeline<'a>,
        gates: GateThresholds,
        max_iterations: u32,
    ) -> Self {
        Self {
            generator,
            verifier,
            gates,
            max_iterations,
        }
    }

    /// Never fails: model and verification failures become deficiencies
    /// on a finalized section, keeping the last successful draft.
    pub fn run(&self, section: Section, prompt: &str, previous: &[String]) -> SectionOutcome {
        let mut outcome = SectionOutcome::new(section);
        let mut corrections: Option<String> = None;

        loop {
            let draft = match self.generator.generate(
                &outcome.section,
                prompt,
                previous,
                corrections.as_deref(),
            ) {
                Ok(draft) => draft,
                Err(e) => {
                    warn!(section = outcome.section.id, error = %e, "drafting failed, finalizing section");
                    outcome.deficiencies.push(format!("drafting failed: {e}"));
                    if let (Some(verification), Some(gate)) = (&outcome.verification, &outcome.gate) {
                        outcome
                            .deficiencies
                            .extend(deficiencies(verification, gate, &self.gates));
                    }
                    outcome.external_failure = Some(e.to_string());
                    break;
                }
            };
            outcome.model_calls += draft.model_calls;
            outcome.files_read.extend(draft.files_read);
            if draft.state == LoopState::Cancelled {
                outcome.cancelled = true;
                outcome
                    .deficiencies
                    .push("run cancelled before the section was finished".to_string());
                return outcome;
            }
            outcome.section.draft_text = draft.text;
            outcome.section.status = SectionStatus::Drafted;

            let verification = match self.verifier.verify_section(&outcome.section) {
                Ok(v) => v,
                Err(e) => {
                    warn!(section = outcome.section.id, error = %e, "verification failed, finalizing section");
                    outcome.deficiencies.push(format!("verification failed: {e}"));
                    break;
                }
            };
            outcome.section.citations = verification.citations.clone();
            outcome.section.status = SectionStatus::Gated;
            let gate = evaluate(&verification, &self.gates);
            debug!(
                section = outcome.section.id,
                iteration = outcome.iterations,
                coverage = gate.coverage_ratio,
                validity = gate.validity_rate,
                passed = gate.passed,
                "section gated"
            );

            if gate.passed {
                // Invalid citations the validity threshold tolerates.
                outcome.deficiencies = deficiencies(&verification, &gate, &self.gates);
                outcome.verification = Some(verification);
                outcome.gate = Some(gate);
                break;
            }
            if outcome.iterations >= self.max_iterations {
                outcome.deficiencies = deficiencies(&verification, &gate, &self.gates);
                warn!(
                    section = outcome.section.id,
                    iterations = outcome.iterations,
                    deficiencies = outcome.deficiencies.len(),
                    "correction budget exhausted"
                );
                outcome.verification = Some(verification);
                outcome.gate = Some(gate);
                break;
            }

            corrections = Some(corrective_prompt(&verification, &gate));
            outcome.iterations += 1;
            info!(
                section = outcome.section.id,
                iteration = outcome.iterations,
                failures = verification.failures().len(),
                "regenerating section"
            );
            outcome.verification = Some(verification);
            outcome.gate = Some(gate);
        }

        outcome.section.status = SectionStatus::Final;
        outcome
    }
}

/// System prompt addendum for the next regeneration.
fn corrective_prompt(verification: &SectionVerification, gate: &GateResult) -> String {
    let mut text = String::new();
    let failures = verification.failures();
    if !failures.is_empty() {
        text.push_str(&prompts::citation_fix(&failures));
    }
    if !gate.coverage_passed {
        text.push_str(&prompts::coverage_fix(
            verification.coverage.symbols_referenced,
            verification.coverage.symbols_total,
            &verification.uncovered,
        ));
    }
    text
}

fn deficiencies(
    verification: &SectionVerification,
    gate: &GateResult,
    thresholds: &GateThresholds,
) -> Vec<String> {
    let mut out = gate.reasons(thresholds);
    for (citation, verdict) in verification.failures() {
        out.push(format!(
            "[{citation}] {} ({})",
            verdict.reason,
            verdict.label()
        ));
    }
    if !verification.uncited.is_empty() {
        out.push(format!(
            "{} sentence(s) without a citation",
            verification.uncited.len()
        ));
    }
    out
}
