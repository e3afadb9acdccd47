//! `docweave`: generate a cited report for a repository, or inspect a
//! persisted store.
//!
//! Exit codes: 0 on a finalized report, 1 when an external call failed for
//! good (or the run was cancelled), 2 on invalid input paths or config.

mod commands;
mod logging;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docweave_core::PipelineError;
use tracing::error;

use commands::audit::AuditArgs;
use commands::run::RunArgs;
use logging::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "docweave",
    version,
    about = "Codebase-aware documentation with verified citations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a repository and write a cited report
    Run(RunArgs),
    /// Read-only inspection of a persisted store
    Audit(AuditArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format);

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Audit(args) => commands::audit::execute(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "docweave failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PipelineError>() {
        Some(e) if e.is_input_error() => 2,
        _ => 1,
    }
}
