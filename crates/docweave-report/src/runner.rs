//! The run driver.
//!
//! Phase 1: Ingest → Phase 2: Budgets → Phase 3: Explore → Phase 4: Outline
//! → Phase 5: Sections (draft, verify, correct; concurrent across sections)
//! → Phase 6: Assemble

use std::path::Path;

use chrono::Utc;
use docweave_agent::prompts;
use docweave_agent::{AgentLoop, LoopState, OutlineGenerator, SectionGenerator, ToolContext};
use docweave_citations::{CitationPipeline, SpanResolver, VerificationSummary};
use docweave_core::config::{BudgetConfig, Budgets, RunConfig};
use docweave_core::errors::PipelineError;
use docweave_core::models::{DegradationEvent, Section, SectionStatus};
use docweave_core::traits::{Cancellable, CancellationToken, IEmbeddingProvider, ILanguageModel};
use docweave_embeddings::EmbeddingEngine;
use docweave_ingest::{IngestPipeline, IngestReport};
use docweave_retrieval::RetrievalEngine;
use docweave_storage::StoreEngine;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::assembler;
use crate::complexity::ComplexityAnalysis;
use crate::correction::{CorrectionLoop, SectionOutcome};

/// Files handed to a fallback outline when exploration read nothing.
const FALLBACK_OUTLINE_FILES: usize = 20;

/// Budgets chosen for a run, and the analysis behind them.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunPlan {
    pub complexity: Option<ComplexityAnalysis>,
    pub budgets: Budgets,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplorationSummary {
    pub state: LoopState,
    pub steps: u32,
    pub files_read: Vec<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub title: String,
    pub markdown: String,
    pub ingest: IngestReport,
    pub plan: RunPlan,
    pub exploration: Option<ExplorationSummary>,
    pub sections: Vec<SectionOutcome>,
    /// Verdict totals across every section's kept draft.
    pub summary: VerificationSummary,
    pub symbols_referenced: usize,
    pub symbols_total: usize,
    pub degradation_events: Vec<DegradationEvent>,
    pub cancelled: bool,
}

impl RunReport {
    fn new(prompt: &str, ingest: IngestReport, plan: RunPlan) -> Self {
        Self {
            title: assembler::report_title(prompt),
            markdown: String::new(),
            ingest,
            plan,
            exploration: None,
            sections: Vec::new(),
            summary: VerificationSummary::default(),
            symbols_referenced: 0,
            symbols_total: 0,
            degradation_events: Vec::new(),
            cancelled: false,
        }
    }

    /// Report-wide coverage; 1.0 when no section had scoped symbols.
    pub fn coverage_ratio(&self) -> f64 {
        if self.symbols_total == 0 {
            1.0
        } else {
            self.symbols_referenced as f64 / self.symbols_total as f64
        }
    }

    /// Deficiencies of every section, prefixed with its title.
    pub fn unresolved_issues(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|o| {
                o.deficiencies
                    .iter()
                    .map(move |d| format!("{}: {d}", o.section.title))
            })
            .collect()
    }

    /// Assembles finalized sections only; the rest stay in `sections` with
    /// their deficiencies so they surface in `unresolved_issues`.
    fn finish(&mut self, prompt: &str) {
        let finalized: Vec<&SectionOutcome> = self
            .sections
            .iter()
            .filter(|o| o.section.status == SectionStatus::Final)
            .collect();
        for outcome in &finalized {
            if let Some(v) = &outcome.verification {
                self.summary.merge(&v.summary);
                self.symbols_referenced += v.coverage.symbols_referenced;
                self.symbols_total += v.coverage.symbols_total;
            }
        }
        let sections: Vec<Section> = finalized.iter().map(|o| o.section.clone()).collect();
        self.markdown = assembler::assemble(prompt, &sections);
    }
}

/// Ingest `root` and pick the run's budgets. With `explicit` set, budgets
/// the user left unset scale with the ingested symbol count. Needs no
/// model, so dry runs use it directly.
pub fn ingest_and_plan(
    root: &Path,
    store: &StoreEngine,
    ingest: &IngestPipeline,
    config: &RunConfig,
    explicit: Option<&BudgetConfig>,
    cancel: &CancellationToken,
) -> Result<(IngestReport, RunPlan), PipelineError> {
    let report = ingest.run(root, store, cancel)?;
    info!(
        files = report.files_ingested + report.files_unchanged,
        chunks = report.chunks_written,
        symbols = report.symbols_written,
        skipped = report.skipped.len(),
        "Phase 1: ingested repository"
    );
    let plan = match explicit {
        Some(explicit) => {
            let analysis = ComplexityAnalysis::from_stats(&store.stats()?);
            RunPlan {
                complexity: Some(analysis),
                budgets: analysis.apply(config.budgets, explicit),
            }
        }
        None => RunPlan {
            complexity: None,
            budgets: config.budgets,
        },
    };
    info!(
        bucket = plan.complexity.map(|c| c.bucket.as_str()),
        sections = plan.budgets.max_sections,
        exploration_steps = plan.budgets.max_exploration_steps,
        section_steps = plan.budgets.max_section_steps,
        "Phase 2: budgets resolved"
    );
    Ok((report, plan))
}

pub struct DocRunner<'a> {
    store: &'a StoreEngine,
    ingest: &'a IngestPipeline,
    model: &'a dyn ILanguageModel,
    config: &'a RunConfig,
    cancel: &'a CancellationToken,
    embedder: Option<&'a EmbeddingEngine>,
    /// Budgets the user set; `None` skips complexity budgets.
    explicit_budgets: Option<BudgetConfig>,
}

impl<'a> DocRunner<'a> {
    pub fn new(
        store: &'a StoreEngine,
        ingest: &'a IngestPipeline,
        model: &'a dyn ILanguageModel,
        config: &'a RunConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            store,
            ingest,
            model,
            config,
            cancel,
            embedder: None,
            explicit_budgets: None,
        }
    }

    pub fn with_embedder(mut self, embedder: Option<&'a EmbeddingEngine>) -> Self {
        self.embedder = embedder;
        self
    }

    /// Scale unset budgets to the size of the ingested repository.
    pub fn with_complexity_budgets(mut self, explicit: BudgetConfig) -> Self {
        self.explicit_budgets = Some(explicit);
        self
    }

    /// Phases 1 and 2 only.
    pub fn ingest_and_plan(&self, root: &Path) -> Result<(IngestReport, RunPlan), PipelineError> {
        ingest_and_plan(
            root,
            self.store,
            self.ingest,
            self.config,
            self.explicit_budgets.as_ref(),
            self.cancel,
        )
    }

    /// Run every phase. Model exhaustion during exploration or outlining
    /// is fatal; inside a section it finalizes that section with a
    /// deficiency. Cancellation after ingestion yields a report holding
    /// whatever sections were finished.
    pub fn run(&self, root: &Path, prompt: &str) -> Result<RunReport, PipelineError> {
        let (ingest, plan) = self.ingest_and_plan(root)?;
        let mut report = RunReport::new(prompt, ingest, plan);

        let retrieval = RetrievalEngine::from_run_config(self.store, self.config)
            .with_embedder(self.embedder.map(|e| e as &dyn IEmbeddingProvider));
        let tools = ToolContext::new(root, &retrieval, self.ingest);

        let mut task = prompt.trim().to_string();
        if let Some(analysis) = &plan.complexity {
            task.push_str("\n\n");
            task.push_str(&analysis.prompt_context(&plan.budgets));
        }
        let exploration = AgentLoop::new(self.model, &tools, self.cancel)
            .with_max_steps(plan.budgets.max_exploration_steps)
            .run(prompts::EXPLORATION_SYSTEM, &prompts::exploration_user(&task))?;
        let files_read: Vec<String> = exploration.files_read.iter().cloned().collect();
        info!(
            state = ?exploration.state,
            steps = exploration.steps,
            files = files_read.len(),
            "Phase 3: exploration done"
        );
        report.exploration = Some(ExplorationSummary {
            state: exploration.state,
            steps: exploration.steps,
            files_read: files_read.clone(),
        });
        if exploration.is_cancelled() {
            return Ok(self.cancelled(report, prompt));
        }

        let fallback_files = if files_read.is_empty() {
            self.store
                .list_files()?
                .into_iter()
                .take(FALLBACK_OUTLINE_FILES)
                .map(|f| f.path)
                .collect()
        } else {
            files_read
        };
        let outline = OutlineGenerator::new(self.model).generate(
            prompt,
            &exploration.text,
            &fallback_files,
            plan.budgets.max_sections as usize,
        )?;
        info!(sections = outline.len(), "Phase 4: outline ready");

        report.sections = self.write_sections(root, prompt, outline, &retrieval, &tools, plan.budgets);
        let passed = report.sections.iter().filter(|o| o.passed()).count();
        info!(
            sections = report.sections.len(),
            passed,
            "Phase 5: sections finalized"
        );

        report.degradation_events = self.degradation_events(&report.sections);
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled(report, prompt));
        }
        report.finish(prompt);
        info!(
            validity = report.summary.validity_rate,
            coverage = report.coverage_ratio(),
            "Phase 6: report assembled"
        );
        Ok(report)
    }

    fn cancelled(&self, mut report: RunReport, prompt: &str) -> RunReport {
        warn!(sections = report.sections.len(), "run cancelled, emitting partial report");
        report.cancelled = true;
        report.finish(prompt);
        report
    }

    fn write_sections(
        &self,
        root: &Path,
        prompt: &str,
        outline: Vec<Section>,
        retrieval: &RetrievalEngine<'_>,
        tools: &ToolContext<'_>,
        budgets: Budgets,
    ) -> Vec<SectionOutcome> {
        // Drafting is concurrent, so earlier sections are known by their
        // outline entry rather than their text.
        let headings: Vec<String> = outline
            .iter()
            .map(|s| format!("{}: {}", s.title, s.focus))
            .collect();
        let draft_one = |(index, section): (usize, Section)| -> SectionOutcome {
            if self.cancel.is_cancelled() {
                return SectionOutcome::skipped(section);
            }
            let generator = SectionGenerator::new(self.model, tools, self.cancel, budgets);
            let verifier = CitationPipeline::new(
                SpanResolver::new(self.store, root),
                retrieval,
                self.config.citations,
            )
            .with_judge(self.model);
            let correction = CorrectionLoop::new(
                &generator,
                &verifier,
                self.config.gates,
                budgets.max_correction_iterations,
            );
            correction.run(section, prompt, &headings[..index])
        };

        let sections: Vec<(usize, Section)> = outline.into_iter().enumerate().collect();
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_concurrency.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| {
                sections
                    .into_par_iter()
                    .map(draft_one)
                    .collect()
            }),
            Err(e) => {
                warn!(error = %e, "section pool unavailable, drafting sequentially");
                sections.into_iter().map(draft_one).collect()
            }
        }
    }

    fn degradation_events(&self, sections: &[SectionOutcome]) -> Vec<DegradationEvent> {
        let mut events = self.embedder.map(|e| e.drain_events()).unwrap_or_default();
        for outcome in sections {
            if let Some(failure) = &outcome.external_failure {
                events.push(DegradationEvent {
                    component: format!("section:{}", outcome.section.title),
                    failure: failure.clone(),
                    fallback_used: "finalized with deficiency".to_string(),
                    timestamp: Utc::now(),
                });
            }
        }
        events
    }
}
