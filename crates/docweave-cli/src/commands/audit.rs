//! `docweave audit`: read-only inspection of a persisted store.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use docweave_core::config::{RankWeights, RunConfig};
use docweave_core::models::{Direction, SymbolKind, SymbolRecord};
use docweave_core::PipelineError;
use docweave_retrieval::RetrievalEngine;
use docweave_storage::{StoreEngine, SymbolFilter};

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Store written by `run --persist-store`
    #[arg(long)]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Every ingested file with its language and line count
    ListFiles,
    /// Symbols, optionally narrowed by file, name or kind
    ListSymbols {
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        kind: Option<String>,
    },
    /// Ranked chunk search
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// A symbol's definition, what it refers to, and what refers to it
    Neighbors { name: String },
    /// The whole store as JSON
    Export,
}

pub fn execute(args: AuditArgs) -> anyhow::Result<()> {
    if !args.store.is_file() {
        return Err(PipelineError::InvalidInput {
            path: args.store.display().to_string(),
            reason: "store not found".to_string(),
        }
        .into());
    }
    let store = StoreEngine::open(&args.store).map_err(PipelineError::from)?;
    let stdout = std::io::stdout();
    render(&args.command, &store, &mut stdout.lock())
}

fn render(command: &AuditCommand, store: &StoreEngine, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        AuditCommand::ListFiles => {
            for file in store.list_files()? {
                writeln!(out, "{}\t{}\t{}", file.path, file.language, file.line_count)?;
            }
        }
        AuditCommand::ListSymbols { path, name, kind } => {
            let kind = kind
                .as_deref()
                .map(str::parse::<SymbolKind>)
                .transpose()
                .map_err(|reason| PipelineError::InvalidInput {
                    path: "--kind".to_string(),
                    reason,
                })?;
            let mut symbols = match (path, name) {
                (Some(path), _) => store.get_symbols(SymbolFilter::File(path))?,
                (None, Some(name)) => store.get_symbols(SymbolFilter::Name(name))?,
                (None, None) => store.export()?.symbols,
            };
            symbols.retain(|s| {
                name.as_deref().map_or(true, |n| s.name == n) && kind.map_or(true, |k| s.kind == k)
            });
            for symbol in &symbols {
                writeln!(out, "{}", symbol_line(symbol))?;
            }
        }
        AuditCommand::Search { query, limit } => {
            let retrieval = RetrievalEngine::new(store, RankWeights::default(), *limit);
            for hit in retrieval.search_text(query, *limit)? {
                writeln!(
                    out,
                    "{:.3}\t{}:{}-{}",
                    hit.score, hit.chunk.file_path, hit.chunk.start_line, hit.chunk.end_line
                )?;
            }
        }
        AuditCommand::Neighbors { name } => {
            let retrieval = RetrievalEngine::from_run_config(store, &RunConfig::default());
            let Some(definition) = retrieval.get_definition(name)? else {
                writeln!(out, "no definition for `{name}`")?;
                return Ok(());
            };
            writeln!(out, "definition\t{}", symbol_line(&definition))?;
            for edge in store.get_edges(definition.id, Direction::Outgoing)? {
                let target = if edge.is_dangling() { " (unresolved)" } else { "" };
                writeln!(out, "{}\t{}{target}", edge.kind.as_str(), edge.to_name)?;
            }
            for reference in retrieval.get_references(name)? {
                writeln!(out, "referenced-by\t{}", symbol_line(&reference))?;
            }
        }
        AuditCommand::Export => {
            serde_json::to_writer_pretty(&mut *out, &store.export()?)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn symbol_line(symbol: &SymbolRecord) -> String {
    format!(
        "{}\t{}\t{}:{}-{}",
        symbol.kind.as_str(),
        symbol.qualified_name(),
        symbol.file_path,
        symbol.start_line,
        symbol.end_line
    )
}
