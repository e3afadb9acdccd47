//! IngestPipeline: walk, classify, chunk, and write a repository into the
//! store. Reading and chunking run in parallel; writes go through the
//! store's single writer, one transaction per file.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use docweave_core::config::IngestConfig;
use docweave_core::errors::{IngestError, PipelineError};
use docweave_core::models::{SkipReason, SkipRecord};
use docweave_core::traits::{Cancellable, CancellationToken};
use docweave_storage::{FileWrite, StoreEngine, WriteOutcome};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chunker::{whole_file_chunks, ChunkerRegistry, FileChunks};
use crate::scanner::binary::is_binary;
use crate::scanner::hasher::content_hash_hex;
use crate::scanner::{walk_repository, WalkEntry};

/// Totals for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub files_ingested: usize,
    pub files_unchanged: usize,
    pub files_pruned: usize,
    pub chunks_written: usize,
    pub symbols_written: usize,
    pub edges_written: usize,
    pub references_resolved: usize,
    pub skipped: Vec<SkipRecord>,
}

/// Outcome for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written { chunks: usize, symbols: usize, edges: usize },
    Unchanged,
    Skipped(SkipReason),
}

enum Prepared {
    Ready(FileWrite),
    Unchanged(String),
    Skipped(SkipRecord),
}

pub struct IngestPipeline {
    registry: ChunkerRegistry,
    config: IngestConfig,
}

impl IngestPipeline {
    pub fn new(config: IngestConfig) -> Self {
        Self::with_registry(config, ChunkerRegistry::with_defaults())
    }

    pub fn with_registry(config: IngestConfig, registry: ChunkerRegistry) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest every non-ignored file under `root`. Files that vanished from
    /// disk since a previous run against the same store are pruned.
    pub fn run(
        &self,
        root: &Path,
        store: &StoreEngine,
        cancel: &CancellationToken,
    ) -> Result<IngestReport, PipelineError> {
        check_root(root)?;
        let started = Instant::now();
        let entries = walk_repository(root, &self.config)?;
        info!(root = %root.display(), files = entries.len(), "ingestion started");

        let prepared: Vec<Prepared> = entries
            .par_iter()
            .filter(|_| !cancel.is_cancelled())
            .map(|entry| self.prepare(entry, store))
            .collect::<Result<_, _>>()?;
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let mut report = IngestReport::default();
        let mut present = HashSet::with_capacity(prepared.len());
        for item in prepared {
            match item {
                Prepared::Ready(file) => {
                    if cancel.is_cancelled() {
                        return Err(PipelineError::Cancelled);
                    }
                    present.insert(file.path.clone());
                    match store.replace_file(&file)? {
                        WriteOutcome::Unchanged => report.files_unchanged += 1,
                        WriteOutcome::Written {
                            chunks,
                            symbols,
                            edges,
                            pruned,
                        } => {
                            debug!(path = %file.path, chunks, symbols, edges, pruned, "file written");
                            report.files_ingested += 1;
                            report.chunks_written += chunks;
                            report.symbols_written += symbols;
                            report.edges_written += edges;
                        }
                    }
                }
                Prepared::Unchanged(path) => {
                    present.insert(path);
                    report.files_unchanged += 1;
                }
                Prepared::Skipped(skip) => {
                    debug!(path = %skip.path, reason = skip.reason.as_str(), "file skipped");
                    report.skipped.push(skip);
                }
            }
        }

        for stale in store.list_files()? {
            if !present.contains(&stale.path) && store.remove_file(&stale.path)? {
                debug!(path = %stale.path, "pruned file no longer on disk");
                report.files_pruned += 1;
            }
        }

        report.references_resolved = store.resolve_references()?;
        store.checkpoint()?;

        info!(
            ingested = report.files_ingested,
            unchanged = report.files_unchanged,
            pruned = report.files_pruned,
            skipped = report.skipped.len(),
            chunks = report.chunks_written,
            symbols = report.symbols_written,
            edges = report.edges_written,
            resolved = report.references_resolved,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Ingest one root-relative file, e.g. when a tool reads a file the
    /// walk never stored. Does not resolve references.
    pub fn ingest_file(
        &self,
        root: &Path,
        relative: &str,
        store: &StoreEngine,
    ) -> Result<FileOutcome, PipelineError> {
        let absolute = root.join(relative);
        let size = std::fs::metadata(&absolute).map(|m| m.len()).unwrap_or(0);
        let entry = WalkEntry {
            absolute,
            relative: relative.to_string(),
            size,
        };
        match self.prepare(&entry, store)? {
            Prepared::Unchanged(_) => Ok(FileOutcome::Unchanged),
            Prepared::Skipped(skip) => Ok(FileOutcome::Skipped(skip.reason)),
            Prepared::Ready(file) => match store.replace_file(&file)? {
                WriteOutcome::Unchanged => Ok(FileOutcome::Unchanged),
                WriteOutcome::Written {
                    chunks,
                    symbols,
                    edges,
                    ..
                } => Ok(FileOutcome::Written {
                    chunks,
                    symbols,
                    edges,
                }),
            },
        }
    }

    fn prepare(&self, entry: &WalkEntry, store: &StoreEngine) -> Result<Prepared, PipelineError> {
        let skip = |reason| {
            Ok(Prepared::Skipped(SkipRecord {
                path: entry.relative.clone(),
                reason,
            }))
        };

        if entry.size > self.config.effective_max_file_size() {
            return skip(SkipReason::TooLarge);
        }
        let bytes = match std::fs::read(&entry.absolute) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %entry.relative, error = %e, "unreadable file");
                return skip(SkipReason::Unreadable);
            }
        };
        if is_binary(&bytes) {
            return skip(SkipReason::Binary);
        }
        let Ok(source) = std::str::from_utf8(&bytes) else {
            return skip(SkipReason::Unreadable);
        };
        let relative = Path::new(&entry.relative);
        let Some(chunker) = self.registry.for_path(relative) else {
            return skip(SkipReason::UnsupportedLanguage);
        };

        let content_hash = content_hash_hex(&bytes);
        if store.file_hash(&entry.relative)?.as_deref() == Some(content_hash.as_str()) {
            return Ok(Prepared::Unchanged(entry.relative.clone()));
        }

        let FileChunks {
            chunks,
            symbols,
            edges,
        } = match chunker.chunk(relative, source) {
            Ok(out) => out,
            Err(e) => {
                warn!(path = %entry.relative, error = %e, "structural chunking failed, storing whole file");
                whole_file_chunks(relative, source)
            }
        };

        Ok(Prepared::Ready(FileWrite {
            path: entry.relative.clone(),
            language: chunker.language().as_str().to_string(),
            content_hash,
            line_count: source.lines().count() as u32,
            chunks,
            symbols,
            edges,
        }))
    }
}

fn check_root(root: &Path) -> Result<(), IngestError> {
    if !root.exists() {
        return Err(IngestError::RootNotFound {
            path: root.display().to_string(),
        });
    }
    if !root.is_dir() {
        return Err(IngestError::RootNotDirectory {
            path: root.display().to_string(),
        });
    }
    Ok(())
}
