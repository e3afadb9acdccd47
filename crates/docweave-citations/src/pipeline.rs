//! Runs the seven stages over one section.

use docweave_core::config::CitationSettings;
use docweave_core::errors::CitationError;
use docweave_core::models::{Citation, CitationVerdict, ClaimType, CoverageReport, Section};
use docweave_core::traits::ILanguageModel;
use docweave_ingest::scanner::normalize_relative;
use docweave_retrieval::RetrievalEngine;
use serde::Serialize;
use tracing::{debug, info};

use crate::stages::aggregate::{aggregate, VerificationSummary};
use crate::stages::classify::{check_anchors, classify_claim};
use crate::stages::coverage::{compute_coverage, uncovered_symbols};
use crate::stages::extract::{extract_citations, uncited_sentences};
use crate::stages::extractive::verify_extractive;
use crate::stages::judge::BatchedJudge;
use crate::stages::structure::{validate_structure, Resolution, SpanResolver};

/// Everything verification learned about one section draft.
#[derive(Debug, Clone, Serialize)]
pub struct SectionVerification {
    pub section_id: usize,
    pub citations: Vec<Citation>,
    /// One per citation, same order.
    pub verdicts: Vec<CitationVerdict>,
    pub coverage: CoverageReport,
    pub summary: VerificationSummary,
    /// Factual sentences carrying no citation.
    pub uncited: Vec<String>,
    /// Scoped definitions no citation reaches.
    pub uncovered: Vec<String>,
    pub judge_calls: usize,
}

impl SectionVerification {
    /// Citations whose verdict is not `valid`, paired with that verdict.
    pub fn failures(&self) -> Vec<(&Citation, &CitationVerdict)> {
        self.citations
            .iter()
            .zip(&self.verdicts)
            .filter(|(_, v)| !v.is_valid())
            .collect()
    }
}

pub struct CitationPipeline<'a> {
    resolver: SpanResolver<'a>,
    retrieval: &'a RetrievalEngine<'a>,
    judge_model: Option<&'a dyn ILanguageModel>,
    settings: CitationSettings,
}

impl<'a> CitationPipeline<'a> {
    pub fn new(
        resolver: SpanResolver<'a>,
        retrieval: &'a RetrievalEngine<'a>,
        settings: CitationSettings,
    ) -> Self {
        Self {
            resolver,
            retrieval,
            judge_model: None,
            settings,
        }
    }

    /// Without a judge, abstractive claims are `unverifiable`.
    pub fn with_judge(mut self, model: &'a dyn ILanguageModel) -> Self {
        self.judge_model = Some(model);
        self
    }

    pub fn verify_section(&self, section: &Section) -> Result<SectionVerification, CitationError> {
        let citations = extract_citations(section.id, &section.draft_text)?;
        let mut judge = self
            .judge_model
            .map(|m| BatchedJudge::new(m, self.settings.judge_batch_size));
        let mut verdicts: Vec<Option<CitationVerdict>> = Vec::with_capacity(citations.len());

        for citation in &citations {
            let span = match validate_structure(citation, &self.resolver)? {
                Resolution::Resolved(span) => span,
                Resolution::Unresolved(verdict) => {
                    verdicts.push(Some(verdict));
                    continue;
                }
            };
            if let Some(verdict) = check_anchors(citation.id, &citation.claim_text, &span.text) {
                verdicts.push(Some(verdict));
                continue;
            }
            let claim_type = classify_claim(
                &citation.claim_text,
                &span.text,
                self.settings.extractive_threshold,
            );
            debug!(citation = %citation, ?claim_type, "claim classified");
            match (claim_type, judge.as_mut()) {
                (ClaimType::Extractive, _) => verdicts.push(Some(verify_extractive(
                    citation.id,
                    &citation.claim_text,
                    &span.text,
                    self.settings.keyword_threshold,
                ))),
                (ClaimType::Abstractive, Some(judge)) => {
                    judge.submit(citation.id, &citation.claim_text, &span.text);
                    verdicts.push(None);
                }
                (ClaimType::Abstractive, None) => verdicts.push(Some(
                    CitationVerdict::unverifiable(citation.id, "no judge model configured"),
                )),
            }
        }

        let (judged, judge_calls) = judge.map(BatchedJudge::finish).unwrap_or_default();
        for verdict in judged {
            if let Some(slot) = verdicts.get_mut(verdict.citation_id) {
                *slot = Some(verdict);
            }
        }
        let verdicts: Vec<CitationVerdict> = verdicts
            .into_iter()
            .zip(&citations)
            .map(|(v, c)| {
                v.unwrap_or_else(|| CitationVerdict::unverifiable(c.id, "judge returned no verdict"))
            })
            .collect();

        let scope: Vec<String> = section
            .relevant_files
            .iter()
            .filter_map(|p| normalize_relative(p))
            .collect();
        let scoped_symbols = self.retrieval.scope_symbols(&scope)?;
        let coverage = compute_coverage(section.id, &citations, &scoped_symbols);
        let uncovered = uncovered_symbols(&citations, &scoped_symbols);
        let summary = aggregate(&verdicts);
        let uncited = uncited_sentences(&section.draft_text);

        info!(
            section = section.id,
            citations = citations.len(),
            valid = summary.valid,
            coverage = coverage.coverage_ratio,
            uncited = uncited.len(),
            "section verified"
        );
        Ok(SectionVerification {
            section_id: section.id,
            citations,
            verdicts,
            coverage,
            summary,
            uncited,
            uncovered,
            judge_calls,
        })
    }
}
