//! `docweave run`: ingest a repository and write a cited report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use docweave_core::config::docweave_config::{dirs_path, CliOverrides};
use docweave_core::config::RunConfig;
use docweave_core::{CancellationToken, DocweaveConfig, PipelineError};
use docweave_embeddings::EmbeddingEngine;
use docweave_ingest::remote;
use docweave_ingest::scanner::hasher::content_hash_hex;
use docweave_ingest::IngestPipeline;
use docweave_llm::{OpenAiCompatibleClient, RetryPolicy, RetryingModel};
use docweave_report::{ingest_and_plan, write_report, DocRunner, RunContext, RunReport};
use docweave_storage::StoreEngine;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Local directory or git URL to document
    pub repo: String,

    /// File holding the documentation request
    #[arg(long)]
    pub prompt: PathBuf,

    /// Report path; the metadata sidecar is written next to it.
    /// Without it the report goes to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub max_exploration_steps: Option<u32>,

    #[arg(long)]
    pub max_sections: Option<u32>,

    #[arg(long)]
    pub max_section_steps: Option<u32>,

    #[arg(long)]
    pub max_correction_iterations: Option<u32>,

    #[arg(long)]
    pub coverage_threshold: Option<f64>,

    #[arg(long)]
    pub validity_threshold: Option<f64>,

    /// Keep the store on disk; defaults to a path under the cache dir
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    pub persist_store: Option<Option<PathBuf>>,

    /// Ingest and print the chosen budgets without calling a model
    #[arg(long)]
    pub dry_run: bool,

    /// Use configured budgets as-is instead of scaling to repository size
    #[arg(long)]
    pub skip_complexity: bool,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Sections drafted at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request model timeout
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Where clones and persisted stores live (default ~/.docweave/cache)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

impl RunArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            max_exploration_steps: self.max_exploration_steps,
            max_sections: self.max_sections,
            max_section_steps: self.max_section_steps,
            max_correction_iterations: self.max_correction_iterations,
            coverage_threshold: self.coverage_threshold,
            validity_threshold: self.validity_threshold,
            max_concurrency: self.concurrency,
            timeout_secs: self.timeout_secs,
        }
    }

    fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .or_else(|| dirs_path().map(|d| d.join("cache")))
            .unwrap_or_else(|| PathBuf::from(".docweave-cache"))
    }
}

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let prompt = std::fs::read_to_string(&args.prompt).map_err(|e| PipelineError::InvalidInput {
        path: args.prompt.display().to_string(),
        reason: e.to_string(),
    })?;
    let cache = args.cache_dir();
    let root = resolve_repo(&args.repo, &cache)?;

    let config = DocweaveConfig::load(&root, Some(&args.overrides())).map_err(PipelineError::from)?;
    let run_config = config.resolve();

    let store = open_store(&args, &cache)?;
    let ingest = IngestPipeline::new(config.ingest.clone());
    let cancel = match run_config.wall_clock {
        Some(budget) => CancellationToken::with_deadline(budget),
        None => CancellationToken::default(),
    };
    let explicit = (!args.skip_complexity).then_some(&config.budgets);

    if args.dry_run {
        let (ingested, plan) = ingest_and_plan(&root, &store, &ingest, &run_config, explicit, &cancel)?;
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "repo": root.display().to_string(),
            "ingest": ingested,
            "plan": plan,
        }))?);
        return Ok(());
    }

    let client = OpenAiCompatibleClient::from_settings(&run_config.llm).map_err(PipelineError::from)?;
    let model = RetryingModel::new(client, RetryPolicy::from_settings(&run_config.llm), cancel.clone());
    let embedder = EmbeddingEngine::from_config(&config.embeddings, &run_config.llm);

    let mut runner = DocRunner::new(&store, &ingest, &model, &run_config, &cancel)
        .with_embedder(embedder.as_ref());
    if let Some(explicit) = explicit {
        runner = runner.with_complexity_budgets(explicit.clone());
    }
    let report = runner.run(&root, &prompt)?;

    match &args.output {
        Some(output) => {
            let context = RunContext {
                model: run_config.llm.model.clone(),
                repo: args.repo.clone(),
                prompt_file: args.prompt.display().to_string(),
                output_file: output.clone(),
            };
            let sidecar = write_report(&report, &context)?;
            eprintln!("Report:   {}", output.display());
            eprintln!("Metadata: {}", sidecar.display());
        }
        None => print!("{}", report.markdown),
    }
    print_summary(&report, &run_config, &cancel);

    if report.cancelled {
        return Err(PipelineError::Cancelled.into());
    }
    Ok(())
}

/// A local directory, or a cached shallow clone of a remote URL.
fn resolve_repo(repo: &str, cache: &Path) -> Result<PathBuf, PipelineError> {
    if remote::is_remote_url(repo) {
        return Ok(remote::clone_repo(repo, cache)?);
    }
    let path = PathBuf::from(repo);
    if !path.is_dir() {
        return Err(PipelineError::InvalidInput {
            path: repo.to_string(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(path)
}

fn open_store(args: &RunArgs, cache: &Path) -> Result<StoreEngine, PipelineError> {
    let Some(persist) = &args.persist_store else {
        return Ok(StoreEngine::open_in_memory()?);
    };
    let path = persist.clone().unwrap_or_else(|| default_store_path(cache, &args.repo));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::InvalidInput {
            path: parent.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    info!(store = %path.display(), "persisting store");
    Ok(StoreEngine::open(&path)?)
}

/// `<cache>/<name>-<hash>.db`, stable per repository argument.
fn default_store_path(cache: &Path, repo: &str) -> PathBuf {
    cache.join(format!(
        "{}-{}.db",
        remote::repo_name(repo),
        content_hash_hex(repo.as_bytes())
    ))
}

fn print_summary(report: &RunReport, config: &RunConfig, cancel: &CancellationToken) {
    let passed = report.sections.iter().filter(|o| o.passed()).count();
    eprintln!(
        "Sections: {}/{} passed (coverage >= {:.2}, validity >= {:.2})",
        passed,
        report.sections.len(),
        config.gates.coverage,
        config.gates.validity
    );
    eprintln!(
        "Citations: {} total, {} valid, {} invalid, {} unverifiable",
        report.summary.total,
        report.summary.valid,
        report.summary.invalid,
        report.summary.unverifiable
    );
    eprintln!(
        "Coverage: {:.2}  Validity: {:.2}",
        report.coverage_ratio(),
        report.summary.validity_rate
    );
    let issues = report.unresolved_issues();
    if !issues.is_empty() {
        eprintln!("Unresolved issues:");
        for issue in &issues {
            eprintln!("  - {issue}");
        }
    }
    for event in &report.degradation_events {
        warn!(
            component = %event.component,
            failure = %event.failure,
            fallback = %event.fallback_used,
            "degraded"
        );
    }
    if report.cancelled {
        if cancel.remaining() == Some(Duration::ZERO) {
            eprintln!("Wall-clock budget reached; the report is partial.");
        } else {
            eprintln!("Run cancelled; the report is partial.");
        }
    }
}
