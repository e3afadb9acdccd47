//! The citation pipeline end to end over an ingested repository.

use docweave_citations::{CitationPipeline, SpanResolver};
use docweave_core::config::{CitationSettings, IngestConfig, RunConfig};
use docweave_core::models::{ClaimType, Section, Severity, VerdictStatus};
use docweave_core::traits::CancellationToken;
use docweave_ingest::IngestPipeline;
use docweave_retrieval::RetrievalEngine;
use docweave_storage::StoreEngine;
use test_fixtures::{FixtureRepo, ScriptedModel};

fn ingest(repo: &FixtureRepo) -> StoreEngine {
    let store = StoreEngine::open_in_memory().unwrap();
    IngestPipeline::new(IngestConfig::default())
        .run(repo.path(), &store, &CancellationToken::new())
        .unwrap();
    store
}

fn section(id: usize, text: &str, files: &[&str]) -> Section {
    let mut s = Section::new(id, "Test", "test focus");
    s.draft_text = text.to_string();
    s.relevant_files = files.iter().map(|f| f.to_string()).collect();
    s
}

fn config_repo() -> FixtureRepo {
    let mut source = String::new();
    for i in 1..=38 {
        source.push_str(&format!("SETTING_{i} = {i}\n"));
    }
    source.push('\n');
    source.push_str("def render_banner(title):\n");
    source.push_str("    width = len(title) + 4\n");
    source.push_str("    line = '*' * width\n");
    source.push_str("    print(line)\n");
    source.push_str("    print('* ' + title + ' *')\n");
    source.push_str("    print(line)\n");
    FixtureRepo::new().with_file("config.py", &source)
}

#[test]
fn claim_about_absent_function_is_invalid_major() {
    let repo = config_repo();
    let store = ingest(&repo);
    let retrieval = RetrievalEngine::from_run_config(&store, &RunConfig::default());
    let pipeline = CitationPipeline::new(
        SpanResolver::new(&store, repo.path()),
        &retrieval,
        CitationSettings::default(),
    );

    let result = pipeline
        .verify_section(&section(
            0,
            "`parseConfig` validates required fields [config.py:40-45].",
            &["config.py"],
        ))
        .unwrap();
    assert_eq!(result.verdicts.len(), 1);
    let verdict = &result.verdicts[0];
    assert_eq!(verdict.status, VerdictStatus::Invalid);
    assert_eq!(verdict.severity, Severity::Major);
    assert_eq!(result.failures().len(), 1);
}

#[test]
fn extractive_claim_and_structural_failures() {
    let repo = FixtureRepo::three_file();
    let store = ingest(&repo);
    let retrieval = RetrievalEngine::from_run_config(&store, &RunConfig::default());
    let pipeline = CitationPipeline::new(
        SpanResolver::new(&store, repo.path()),
        &retrieval,
        CitationSettings::default(),
    );

    let text = "The `alpha` function returns whether the path exists [a.py:4-6].\n\
                It is also described at [a.py:11-40] and [../outside.py:1-2].";
    let result = pipeline.verify_section(&section(3, text, &["a.py"])).unwrap();

    assert_eq!(result.citations.len(), 3);
    assert_eq!(result.verdicts[0].status, VerdictStatus::Valid);
    assert_eq!(result.verdicts[0].claim_type, ClaimType::Extractive);
    for failed in &result.verdicts[1..] {
        assert_eq!(failed.status, VerdictStatus::Invalid);
        assert!(failed.severity >= Severity::Major);
    }
    // alpha is cited, beta is not.
    assert_eq!(result.coverage.symbols_total, 2);
    assert!((result.coverage.coverage_ratio - 0.5).abs() < 1e-9);
    assert_eq!(result.summary.valid, 1);
    assert_eq!(result.summary.invalid, 2);
}

#[test]
fn abstractive_claims_go_to_the_judge() {
    let repo = FixtureRepo::three_file();
    let store = ingest(&repo);
    let retrieval = RetrievalEngine::from_run_config(&store, &RunConfig::default());
    let judge = ScriptedModel::new()
        .then_text(r#"[{"id":0,"supported":true,"reason":"beta delegates"},{"id":1,"supported":false,"reason":"nothing about caching"}]"#);
    let settings = CitationSettings {
        judge_batch_size: 8,
        ..Default::default()
    };
    let pipeline = CitationPipeline::new(SpanResolver::new(&store, repo.path()), &retrieval, settings)
        .with_judge(&judge);

    let text = "Callers are shielded from filesystem details by a thin wrapper [a.py:9-10]. \
                Results are cached aggressively for repeated lookups [a.py:9-10].";
    let result = pipeline.verify_section(&section(1, text, &[])).unwrap();

    assert_eq!(judge.call_count(), 1);
    assert_eq!(result.judge_calls, 1);
    assert_eq!(result.verdicts[0].status, VerdictStatus::Valid);
    assert_eq!(result.verdicts[1].status, VerdictStatus::Invalid);
    assert_eq!(result.verdicts[1].reason, "nothing about caching");
    assert_eq!(result.coverage.coverage_ratio, 1.0);
}

#[test]
fn without_judge_abstractive_is_unverifiable() {
    let repo = FixtureRepo::three_file();
    let store = ingest(&repo);
    let retrieval = RetrievalEngine::from_run_config(&store, &RunConfig::default());
    let pipeline = CitationPipeline::new(
        SpanResolver::new(&store, repo.path()),
        &retrieval,
        CitationSettings::default(),
    );
    let text = "Callers are shielded from filesystem details by a thin wrapper [a.py:9-10].\n\
                The design favours small composable helpers throughout the module.";
    let result = pipeline.verify_section(&section(0, text, &[])).unwrap();
    assert_eq!(result.verdicts[0].status, VerdictStatus::Unverifiable);
    assert_eq!(result.summary.unverifiable, 1);
    assert_eq!(result.uncited.len(), 1);
}
