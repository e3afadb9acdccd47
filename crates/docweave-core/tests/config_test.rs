//! Tests for the docweave configuration system.

use std::sync::Mutex;

use docweave_core::config::{CliOverrides, DocweaveConfig, EmbeddingProviderKind};
use docweave_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all DOCWEAVE_ env vars to prevent cross-test contamination.
fn clear_docweave_env_vars() {
    for key in [
        "DOCWEAVE_MODEL",
        "DOCWEAVE_BASE_URL",
        "DOCWEAVE_LLM_TIMEOUT_SECS",
        "DOCWEAVE_MAX_EXPLORATION_STEPS",
        "DOCWEAVE_MAX_SECTIONS",
        "DOCWEAVE_MAX_CORRECTION_ITERATIONS",
        "DOCWEAVE_COVERAGE_THRESHOLD",
        "DOCWEAVE_VALIDITY_THRESHOLD",
        "DOCWEAVE_MAX_CONCURRENCY",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_docweave_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("docweave.toml"),
        r#"
[budgets]
max_sections = 12
max_exploration_steps = 30

[gates]
coverage_threshold = 0.7
"#,
    )
    .unwrap();

    std::env::set_var("DOCWEAVE_MAX_SECTIONS", "15");

    let cli = CliOverrides {
        max_exploration_steps: Some(80),
        ..Default::default()
    };

    let config = DocweaveConfig::load(dir.path(), Some(&cli)).unwrap();
    // CLI beats project file
    assert_eq!(config.budgets.effective_max_exploration_steps(), 80);
    // env beats project file
    assert_eq!(config.budgets.effective_max_sections(), 15);
    // project file beats defaults
    assert_eq!(config.gates.effective_coverage_threshold(), 0.7);
    // untouched values keep their defaults
    assert_eq!(config.gates.effective_validity_threshold(), 0.8);

    clear_docweave_env_vars();
}

#[test]
fn test_missing_project_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_docweave_env_vars();

    let dir = tempdir();
    let config = DocweaveConfig::load(dir.path(), None).unwrap();
    let run = config.resolve();
    assert_eq!(run.budgets.max_exploration_steps, 50);
    assert_eq!(run.budgets.max_sections, 20);
    assert_eq!(run.budgets.max_correction_iterations, 2);
    assert_eq!(config.embeddings.effective_provider(), EmbeddingProviderKind::Tfidf);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_docweave_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("docweave.toml"), "[budgets\nmax_sections = ").unwrap();
    let err = DocweaveConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_threshold_out_of_range_rejected() {
    let config = DocweaveConfig::from_toml("[gates]\nvalidity_threshold = 1.5\n").unwrap();
    let err = DocweaveConfig::validate(&config).unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => {
            assert_eq!(field, "gates.validity_threshold")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_all_zero_weights_rejected() {
    let config = DocweaveConfig::from_toml(
        "[retrieval]\nlexical_weight = 0.0\ngraph_weight = 0.0\nembedding_weight = 0.0\n",
    )
    .unwrap();
    assert!(DocweaveConfig::validate(&config).is_err());
}

#[test]
fn test_zero_budget_rejected() {
    let config = DocweaveConfig::from_toml("[budgets]\nmax_sections = 0\n").unwrap();
    assert!(DocweaveConfig::validate(&config).is_err());
}

#[test]
fn test_unknown_keys_ignored() {
    let config = DocweaveConfig::from_toml("[budgets]\nmax_sections = 3\nfuture_knob = true\n")
        .unwrap();
    assert_eq!(config.budgets.effective_max_sections(), 3);
}

#[test]
fn test_toml_round_trip_preserves_values() {
    let config = DocweaveConfig::from_toml(
        "[llm]\nmodel = \"local-model\"\ntimeout_secs = 30\n\n[embeddings]\nprovider = \"none\"\n",
    )
    .unwrap();
    let reparsed = DocweaveConfig::from_toml(&config.to_toml().unwrap()).unwrap();
    assert_eq!(reparsed.llm.effective_model(), "local-model");
    assert_eq!(reparsed.llm.effective_timeout_secs(), 30);
    assert_eq!(reparsed.embeddings.effective_provider(), EmbeddingProviderKind::None);
}
