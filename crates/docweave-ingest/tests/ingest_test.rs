//! End-to-end ingestion against on-disk fixture repositories.

use docweave_core::config::IngestConfig;
use docweave_core::errors::{DocweaveErrorCode, PipelineError};
use docweave_core::models::{EdgeKind, SkipReason, SymbolKind};
use docweave_core::traits::{Cancellable, CancellationToken};
use docweave_ingest::pipeline::FileOutcome;
use docweave_ingest::IngestPipeline;
use docweave_storage::{StoreEngine, SymbolFilter};
use test_fixtures::{numbered_lines, FixtureRepo};

fn ingest(repo: &FixtureRepo, store: &StoreEngine) -> docweave_ingest::IngestReport {
    IngestPipeline::new(IngestConfig::default())
        .run(repo.path(), store, &CancellationToken::new())
        .unwrap()
}

#[test]
fn three_file_repo_stores_python_and_skips_binary() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let report = ingest(&repo, &store);

    assert_eq!(report.files_ingested, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, "c.txt");
    assert_eq!(report.skipped[0].reason, SkipReason::Binary);

    let files: Vec<String> = store.list_files().unwrap().into_iter().map(|f| f.path).collect();
    assert_eq!(files, vec!["a.py", "b.py"]);
    assert!(store.get_chunks_for_file("c.txt").unwrap().is_empty());

    let a = store.get_file("a.py").unwrap().unwrap();
    let b = store.get_file("b.py").unwrap().unwrap();
    assert_eq!(a.line_count, 10);
    assert_eq!(b.line_count, 20);

    // Import run, alpha, beta.
    let a_chunks = store.get_chunks_for_file("a.py").unwrap();
    let spans: Vec<(u32, u32)> = a_chunks.iter().map(|c| (c.start_line, c.end_line)).collect();
    assert_eq!(spans, vec![(1, 1), (4, 6), (9, 10)]);
    assert!(a_chunks.iter().all(|c| c.language == "python"));

    let stats = store.stats().unwrap();
    assert_eq!(stats.files, 2);
    assert_eq!(stats.chunks, report.chunks_written);
}

#[test]
fn symbols_and_edges_are_extracted() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let report = ingest(&repo, &store);
    assert!(report.references_resolved > 0);

    let structure = store.get_symbols(SymbolFilter::File("b.py")).unwrap();
    let names: Vec<(&str, SymbolKind)> = structure
        .iter()
        .map(|s| (s.name.as_str(), s.kind))
        .collect();
    assert_eq!(
        names,
        vec![
            ("b.py", SymbolKind::Module),
            ("Gamma", SymbolKind::Class),
            ("__init__", SymbolKind::Method),
            ("add", SymbolKind::Method),
            ("size", SymbolKind::Method),
            ("delta", SymbolKind::Function),
        ]
    );

    let alpha = store.get_symbols(SymbolFilter::Name("alpha")).unwrap();
    assert_eq!(alpha.len(), 1);
    let callers = store
        .get_edges_by_target_name("alpha", EdgeKind::References)
        .unwrap();
    // beta in a.py, Gamma.add in b.py.
    assert_eq!(callers.len(), 2);
    assert!(callers.iter().all(|e| e.to_symbol_id == Some(alpha[0].id)));

    let module = &structure[0];
    let imports = store
        .get_edges(module.id, docweave_core::models::Direction::Outgoing)
        .unwrap();
    assert!(imports
        .iter()
        .any(|e| e.kind == EdgeKind::Imports && e.to_name == "a"));
}

#[test]
fn reingesting_unchanged_repo_is_a_no_op() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    ingest(&repo, &store);
    let before = store.export().unwrap();

    let report = ingest(&repo, &store);
    assert_eq!(report.files_ingested, 0);
    assert_eq!(report.files_unchanged, 2);
    assert_eq!(report.chunks_written, 0);

    let after = store.export().unwrap();
    assert_eq!(before.chunks, after.chunks);
    assert_eq!(before.symbols, after.symbols);
}

#[test]
fn changed_file_supersedes_old_chunks() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    ingest(&repo, &store);
    let old_hash = store.file_hash("a.py").unwrap().unwrap();

    repo.write("a.py", "def omega():\n    return 42\n");
    let report = ingest(&repo, &store);
    assert_eq!(report.files_ingested, 1);
    assert_eq!(report.files_unchanged, 1);

    let chunks = store.get_chunks_for_file("a.py").unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(chunks.iter().all(|c| c.content_hash != old_hash));
    assert!(store.query_fts("beta", 10).unwrap().is_empty());
    assert_eq!(store.query_fts("omega", 10).unwrap().len(), 1);

    // b.py still calls alpha, which no longer exists anywhere.
    let callers = store
        .get_edges_by_target_name("alpha", EdgeKind::References)
        .unwrap();
    assert!(callers.iter().all(|e| e.is_dangling()));
}

#[test]
fn deleted_files_are_pruned_from_persisted_store() {
    let repo = FixtureRepo::three_file();
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("repo.db");
    {
        let store = StoreEngine::open(&db).unwrap();
        ingest(&repo, &store);
    }

    repo.remove("b.py");
    let store = StoreEngine::open(&db).unwrap();
    let report = ingest(&repo, &store);
    assert_eq!(report.files_pruned, 1);
    assert_eq!(report.files_unchanged, 1);
    assert!(store.get_file("b.py").unwrap().is_none());
    assert!(store.get_symbols(SymbolFilter::Name("Gamma")).unwrap().is_empty());
}

#[test]
fn unsupported_and_oversized_files_are_recorded() {
    let repo = FixtureRepo::new()
        .with_file("README.md", "# Title\n")
        .with_file("big.py", &numbered_lines("# filler line", 200))
        .with_file("ok.py", "x = 1\n");
    let store = StoreEngine::open_in_memory().unwrap();
    let config = IngestConfig {
        max_file_size: Some(1024),
        ..Default::default()
    };
    let report = IngestPipeline::new(config)
        .run(repo.path(), &store, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.files_ingested, 1);
    let mut skipped: Vec<(&str, SkipReason)> = report
        .skipped
        .iter()
        .map(|s| (s.path.as_str(), s.reason))
        .collect();
    skipped.sort();
    assert_eq!(
        skipped,
        vec![
            ("README.md", SkipReason::UnsupportedLanguage),
            ("big.py", SkipReason::TooLarge),
        ]
    );
}

#[test]
fn ignored_files_never_reach_the_store() {
    let repo = FixtureRepo::new()
        .with_file(".gitignore", "generated/\n")
        .with_file("generated/out.py", "def gen():\n    pass\n")
        .with_file("src/main.py", "def main():\n    pass\n");
    let store = StoreEngine::open_in_memory().unwrap();
    ingest(&repo, &store);
    let files: Vec<String> = store.list_files().unwrap().into_iter().map(|f| f.path).collect();
    assert_eq!(files, vec!["src/main.py"]);
}

#[test]
fn missing_root_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let store = StoreEngine::open_in_memory().unwrap();
    let err = IngestPipeline::new(IngestConfig::default())
        .run(&dir.path().join("nope"), &store, &CancellationToken::new())
        .unwrap_err();
    assert!(err.is_input_error());
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

#[test]
fn cancelled_run_stops() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = IngestPipeline::new(IngestConfig::default())
        .run(repo.path(), &store, &cancel)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
}

#[test]
fn single_file_ingestion() {
    let repo = FixtureRepo::three_file();
    let store = StoreEngine::open_in_memory().unwrap();
    let pipeline = IngestPipeline::new(IngestConfig::default());

    let outcome = pipeline.ingest_file(repo.path(), "a.py", &store).unwrap();
    assert!(matches!(outcome, FileOutcome::Written { chunks: 3, .. }));
    assert_eq!(
        pipeline.ingest_file(repo.path(), "a.py", &store).unwrap(),
        FileOutcome::Unchanged
    );
    assert_eq!(
        pipeline.ingest_file(repo.path(), "c.txt", &store).unwrap(),
        FileOutcome::Skipped(SkipReason::Binary)
    );
}
