//! Correction loop and full runs against a scripted model.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docweave_agent::{prompts, SectionGenerator, ToolContext};
use docweave_citations::{CitationPipeline, SpanResolver};
use docweave_core::config::{BudgetConfig, Budgets, GateThresholds, IngestConfig, RunConfig};
use docweave_core::errors::{AgentError, DocweaveErrorCode, LlmError, PipelineError};
use docweave_core::models::{ChatResponse, Section, SectionStatus};
use docweave_core::traits::{Cancellable, CancellationToken};
use docweave_ingest::IngestPipeline;
use docweave_report::{write_report, ComplexityBucket, CorrectionLoop, DocRunner, RunContext};
use docweave_retrieval::RetrievalEngine;
use docweave_storage::StoreEngine;
use serde_json::{json, Value};
use test_fixtures::{FixtureRepo, ScriptedModel};

const GOOD_CLAIM: &str = "The `alpha` function returns whether the path exists [a.py:4-6].";
const BAD_CLAIM: &str = "The `alpha` function returns whether the path exists [a.py:11-40].";

fn budgets() -> Budgets {
    Budgets {
        max_section_steps: 3,
        max_uncited_retries: 0,
        max_correction_iterations: 2,
        ..Budgets::default()
    }
}

fn alpha_section() -> Section {
    let mut section = Section::new(0, "Reading files", "How alpha works");
    section.relevant_files = vec!["a.py".to_string()];
    section
}

/// Runs the correction loop for `alpha_section` with the given model.
fn correct(model: &ScriptedModel, gates: GateThresholds) -> docweave_report::SectionOutcome {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let ingest = IngestPipeline::new(IngestConfig::default());
    ingest
        .run(repo.path(), &store, &CancellationToken::new())
        .unwrap();
    let retrieval = RetrievalEngine::from_run_config(&store, &RunConfig::default());
    let tools = ToolContext::new(repo.path(), &retrieval, &ingest);
    let cancel = CancellationToken::new();
    let budgets = budgets();
    let generator = SectionGenerator::new(model, &tools, &cancel, budgets);
    let verifier = CitationPipeline::new(
        SpanResolver::new(&store, repo.path()),
        &retrieval,
        RunConfig::default().citations,
    );
    CorrectionLoop::new(&generator, &verifier, gates, budgets.max_correction_iterations).run(
        alpha_section(),
        "Document the file helpers",
        &[],
    )
}

#[test]
fn failing_section_is_finalized_after_two_regenerations() {
    let model = ScriptedModel::new()
        .then_text(BAD_CLAIM)
        .then_text(BAD_CLAIM)
        .then_text(BAD_CLAIM);
    let outcome = correct(&model, GateThresholds::default());

    assert_eq!(model.call_count(), 3);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.section.status, SectionStatus::Final);
    assert!(!outcome.passed());
    assert!(!outcome.deficiencies.is_empty());
    assert!(outcome
        .deficiencies
        .iter()
        .any(|d| d == "validity 0.00 below threshold 0.80"));
    assert!(outcome.deficiencies.iter().any(|d| d.starts_with("[a.py:11-40]")));
    // The draft is kept, not dropped.
    assert_eq!(outcome.section.draft_text, BAD_CLAIM);
    assert_eq!(outcome.section.citations.len(), 1);

    let retry_system = model.requests()[1].messages[0].content.clone().unwrap();
    assert!(retry_system.contains("failed verification"));
    assert!(retry_system.contains("[a.py:11-40]"));
    assert!(retry_system.contains("alpha (a.py)"));
}

#[test]
fn corrected_draft_passes_and_stops() {
    let model = ScriptedModel::new().then_text(BAD_CLAIM).then_text(GOOD_CLAIM);
    let gates = GateThresholds {
        coverage: 0.5,
        validity: 0.8,
    };
    let outcome = correct(&model, gates);

    assert_eq!(model.call_count(), 2);
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.passed());
    assert!(outcome.deficiencies.is_empty());
    assert_eq!(outcome.section.status, SectionStatus::Final);
    assert!((outcome.coverage_ratio() - 0.5).abs() < 1e-9);
}

#[test]
fn model_exhaustion_keeps_last_draft_with_deficiency() {
    let model = ScriptedModel::new()
        .then_text(GOOD_CLAIM)
        .then_error(LlmError::RetriesExhausted {
            attempts: 3,
            last_error: "status 503".to_string(),
        });
    let outcome = correct(&model, GateThresholds::default());

    assert_eq!(outcome.section.status, SectionStatus::Final);
    assert_eq!(outcome.section.draft_text, GOOD_CLAIM);
    assert!(outcome.external_failure.is_some());
    assert!(outcome.deficiencies[0].starts_with("drafting failed"));
    // The gate verdict of the kept draft is still reported.
    assert!(outcome.gate.is_some());
}

#[test]
fn passing_section_still_lists_tolerated_invalid_citations() {
    let draft = format!("{GOOD_CLAIM} {BAD_CLAIM}");
    let model = ScriptedModel::new().then_text(&draft);
    let gates = GateThresholds {
        coverage: 0.0,
        validity: 0.5,
    };
    let outcome = correct(&model, gates);

    assert!(outcome.passed());
    assert_eq!(outcome.section.status, SectionStatus::Final);
    assert_eq!(outcome.iterations, 0);
    assert_eq!(outcome.deficiencies.len(), 1);
    assert!(outcome.deficiencies[0].starts_with("[a.py:11-40]"));
}

#[test]
fn failed_regeneration_keeps_the_drafts_deficiencies() {
    let model = ScriptedModel::new()
        .then_text(BAD_CLAIM)
        .then_error(LlmError::RetriesExhausted {
            attempts: 3,
            last_error: "status 503".to_string(),
        });
    let outcome = correct(&model, GateThresholds::default());

    assert_eq!(outcome.section.status, SectionStatus::Final);
    assert_eq!(outcome.section.draft_text, BAD_CLAIM);
    assert!(!outcome.passed());
    assert!(outcome.deficiencies[0].starts_with("drafting failed"));
    assert!(outcome
        .deficiencies
        .iter()
        .any(|d| d == "validity 0.00 below threshold 0.80"));
    assert!(outcome.deficiencies.iter().any(|d| d.starts_with("[a.py:11-40]")));
}

fn exploring_model() -> ScriptedModel {
    ScriptedModel::new()
        .then_tool("read_file", json!({"path": "a.py"}))
        .then_tool(
            "finish_exploration",
            json!({"understanding": "a.py holds file helpers; b.py a collection."}),
        )
        .then_text(
            r#"[{"title": "Reading files", "focus": "How alpha works", "relevant_files": ["a.py"]}]"#,
        )
        .then_text(GOOD_CLAIM)
}

fn run_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.gates.coverage = 0.5;
    config.max_concurrency = 1;
    config
}

#[test]
fn full_run_writes_report_and_sidecar() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let ingest = IngestPipeline::new(IngestConfig::default());
    let model = exploring_model();
    let config = run_config();
    let cancel = CancellationToken::new();

    let report = DocRunner::new(&store, &ingest, &model, &config, &cancel)
        .run(repo.path(), "# Document the file helpers\nKeep it short.")
        .unwrap();

    assert_eq!(model.call_count(), 4);
    assert!(!report.cancelled);
    assert_eq!(report.title, "Document the file helpers");
    assert!(report
        .markdown
        .starts_with("# Document the file helpers\n\n## Reading files\n\n"));
    assert!(report.markdown.contains(GOOD_CLAIM));
    assert_eq!(report.sections.len(), 1);
    assert_eq!(report.sections[0].section.status, SectionStatus::Final);
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.valid, 1);
    assert!(report.unresolved_issues().is_empty());
    let exploration = report.exploration.as_ref().unwrap();
    assert_eq!(exploration.files_read, vec!["a.py"]);
    assert_eq!(report.ingest.skipped.len(), 1);

    let out = tempfile::tempdir().unwrap();
    let context = RunContext {
        model: "scripted".to_string(),
        repo: repo.path().display().to_string(),
        prompt_file: "prompt.md".to_string(),
        output_file: out.path().join("docs").join("guide.md"),
    };
    let sidecar = write_report(&report, &context).unwrap();
    assert_eq!(sidecar, out.path().join("docs").join("guide.metadata.json"));
    let markdown = std::fs::read_to_string(out.path().join("docs").join("guide.md")).unwrap();
    assert_eq!(markdown, report.markdown);

    let meta: Value = serde_json::from_str(&std::fs::read_to_string(&sidecar).unwrap()).unwrap();
    assert_eq!(meta["version"], "1.0");
    assert_eq!(meta["model"], "scripted");
    assert_eq!(meta["prompt_file"], "prompt.md");
    assert_eq!(meta["citations"]["total"], 1);
    assert_eq!(meta["citations"]["valid"], 1);
    assert_eq!(meta["citations"]["invalid_list"], json!([]));
    assert_eq!(meta["severity"]["none"], 1);
    assert_eq!(meta["sections"][0]["status"], "final");
    assert_eq!(meta["sections"][0]["iterations"], 0);
    let generated_at = meta["generated_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(generated_at).is_ok());
}

#[test]
fn exploration_failure_is_fatal() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let ingest = IngestPipeline::new(IngestConfig::default());
    let model = ScriptedModel::new().then_error(LlmError::RetriesExhausted {
        attempts: 4,
        last_error: "connection refused".to_string(),
    });
    let config = run_config();
    let cancel = CancellationToken::new();

    let err = DocRunner::new(&store, &ingest, &model, &config, &cancel)
        .run(repo.path(), "Document it")
        .unwrap_err();
    assert!(matches!(err, PipelineError::Agent(AgentError::Llm(_))));
    assert_eq!(err.error_code(), "EXTERNAL_CALL_FAILED");
    assert!(!err.is_input_error());
}

#[test]
fn cancelled_before_start_stops_at_ingestion() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let ingest = IngestPipeline::new(IngestConfig::default());
    let model = ScriptedModel::new();
    let config = run_config();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = DocRunner::new(&store, &ingest, &model, &config, &cancel)
        .run(repo.path(), "Document it")
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(model.call_count(), 0);
}

#[test]
fn complexity_budgets_fill_unset_fields_only() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let ingest = IngestPipeline::new(IngestConfig::default());
    let model = ScriptedModel::new();
    let mut config = run_config();
    config.budgets.max_sections = 4;
    let cancel = CancellationToken::new();
    let explicit = BudgetConfig {
        max_sections: Some(4),
        ..BudgetConfig::default()
    };

    let (_, plan) = DocRunner::new(&store, &ingest, &model, &config, &cancel)
        .with_complexity_budgets(explicit)
        .ingest_and_plan(repo.path())
        .unwrap();
    let analysis = plan.complexity.unwrap();
    assert_eq!(analysis.bucket, ComplexityBucket::Simple);
    assert_eq!(analysis.files, 2);
    assert_eq!(plan.budgets.max_sections, 4);
    assert_eq!(plan.budgets.max_exploration_steps, 100);
    assert_eq!(plan.budgets.max_section_steps, 15);
    assert_eq!(model.call_count(), 0);
}

#[test]
fn sections_draft_concurrently_and_keep_outline_order() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let ingest = IngestPipeline::new(IngestConfig::default());
    let model = ScriptedModel::from_fn(|request| {
        let system = request.messages[0].content.clone().unwrap_or_default();
        if system == prompts::EXPLORATION_SYSTEM {
            Ok(ChatResponse::tool_call(
                "finish_exploration",
                json!({"understanding": "file helpers"}),
            ))
        } else if system == prompts::OUTLINE_SYSTEM {
            Ok(ChatResponse::text(
                r#"[{"title": "First", "focus": "alpha", "relevant_files": ["a.py"]},
                    {"title": "Second", "focus": "alpha again", "relevant_files": ["a.py"]}]"#,
            ))
        } else {
            Ok(ChatResponse::text(GOOD_CLAIM))
        }
    });
    let mut config = run_config();
    config.max_concurrency = 2;
    let cancel = CancellationToken::new();

    let report = DocRunner::new(&store, &ingest, &model, &config, &cancel)
        .run(repo.path(), "Document the helpers")
        .unwrap();

    assert_eq!(model.call_count(), 4);
    let titles: Vec<&str> = report.sections.iter().map(|o| o.section.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second"]);
    assert!(report.sections.iter().all(|o| o.passed()));
    let first = report.markdown.find("## First").unwrap();
    let second = report.markdown.find("## Second").unwrap();
    assert!(first < second);
    assert_eq!(report.summary.total, 2);
}

#[test]
fn cancellation_mid_run_assembles_finished_sections_only() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let ingest = IngestPipeline::new(IngestConfig::default());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let section_requests = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&section_requests);
    let model = ScriptedModel::from_fn(move |request| {
        let system = request.messages[0].content.clone().unwrap_or_default();
        if system == prompts::EXPLORATION_SYSTEM {
            Ok(ChatResponse::tool_call(
                "finish_exploration",
                json!({"understanding": "file helpers"}),
            ))
        } else if system == prompts::OUTLINE_SYSTEM {
            Ok(ChatResponse::text(
                r#"[{"title": "First", "focus": "alpha", "relevant_files": ["a.py"]},
                    {"title": "Second", "focus": "alpha again", "relevant_files": ["a.py"]}]"#,
            ))
        } else if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(ChatResponse::text(GOOD_CLAIM))
        } else {
            trigger.cancel();
            Ok(ChatResponse::text(BAD_CLAIM))
        }
    });
    let config = run_config();

    let report = DocRunner::new(&store, &ingest, &model, &config, &cancel)
        .run(repo.path(), "Document the helpers")
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.sections.len(), 2);
    let finished: Vec<_> = report
        .sections
        .iter()
        .filter(|o| o.section.status == SectionStatus::Final)
        .collect();
    assert_eq!(finished.len(), 1);
    let unfinished = report
        .sections
        .iter()
        .find(|o| o.section.status != SectionStatus::Final)
        .unwrap();
    assert!(unfinished.cancelled);

    assert!(report.markdown.contains(GOOD_CLAIM));
    assert!(!report.markdown.contains("[a.py:11-40]"));
    assert!(report
        .markdown
        .contains(&format!("## {}", finished[0].section.title)));
    assert!(!report
        .markdown
        .contains(&format!("## {}", unfinished.section.title)));
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.valid, 1);

    let issues = report.unresolved_issues();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].starts_with(&format!("{}: run cancelled", unfinished.section.title)));
}
