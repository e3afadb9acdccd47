//! Shared handles the tools run against, and dispatch from request to
//! handler.

use std::path::Path;

use docweave_ingest::IngestPipeline;
use docweave_retrieval::RetrievalEngine;
use docweave_storage::StoreEngine;
use serde_json::{json, Value};
use tracing::debug;

use super::filesystem::{self, ensure_cached, resolve_path};
use super::semantic;
use super::{ToolError, ToolRequest};

/// What a successful tool call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub observation: Value,
    /// Set by `read_file`: the normalized path that was read.
    pub file_read: Option<String>,
}

impl From<Value> for ToolOutput {
    fn from(observation: Value) -> Self {
        Self {
            observation,
            file_read: None,
        }
    }
}

/// Read-only tool environment. Shared by every loop of a run; safe to use
/// from several threads.
pub struct ToolContext<'a> {
    root: &'a Path,
    retrieval: &'a RetrievalEngine<'a>,
    ingest: &'a IngestPipeline,
}

impl<'a> ToolContext<'a> {
    pub fn new(root: &'a Path, retrieval: &'a RetrievalEngine<'a>, ingest: &'a IngestPipeline) -> Self {
        Self {
            root,
            retrieval,
            ingest,
        }
    }

    pub fn root(&self) -> &'a Path {
        self.root
    }

    pub fn retrieval(&self) -> &'a RetrievalEngine<'a> {
        self.retrieval
    }

    pub fn store(&self) -> &'a StoreEngine {
        self.retrieval.store()
    }

    /// Normalize `path` and make sure the store knows the file.
    pub fn cached_path(&self, path: &str) -> Result<String, ToolError> {
        let rel = resolve_path(path)?;
        ensure_cached(self.root, self.store(), self.ingest, &rel)?;
        Ok(rel)
    }

    pub fn execute(&self, request: &ToolRequest) -> Result<ToolOutput, ToolError> {
        debug!(tool = request.kind().name(), "executing tool");
        let output = match request {
            ToolRequest::ListFiles { pattern, path } => {
                filesystem::list_files(self.root, self.ingest.config(), pattern, path.as_deref())?
                    .into()
            }
            ToolRequest::ReadFile {
                path,
                start_line,
                end_line,
            } => {
                let (rel, observation) = filesystem::read_file(
                    self.root,
                    self.store(),
                    self.ingest,
                    path,
                    *start_line,
                    *end_line,
                )?;
                ToolOutput {
                    observation,
                    file_read: Some(rel),
                }
            }
            ToolRequest::GetSymbols { path, kind } => {
                let rel = self.cached_path(path)?;
                semantic::get_symbols(self.retrieval, &rel, kind.as_deref())?.into()
            }
            ToolRequest::GetImports { path } => {
                let rel = self.cached_path(path)?;
                semantic::get_imports(self.retrieval, &rel)?.into()
            }
            ToolRequest::GetDefinition { name } => {
                semantic::get_definition(self.retrieval, name)?.into()
            }
            ToolRequest::GetReferences { name } => {
                semantic::get_references(self.retrieval, name)?.into()
            }
            ToolRequest::GetStructure { path } => {
                let rel = self.cached_path(path)?;
                semantic::get_structure(self.retrieval, &rel)?.into()
            }
            ToolRequest::SearchText { query } => semantic::search_text(self.retrieval, query)?.into(),
            ToolRequest::FinishExploration { .. } => {
                json!({ "status": "Exploration complete." }).into()
            }
        };
        Ok(output)
    }
}
