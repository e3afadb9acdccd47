//! The closed tool set exposed to the model.
//!
//! A tool call is parsed into a `ToolRequest` and executed by
//! `ToolContext::execute`. Failures are returned as `ToolError`s, which the
//! loop turns into JSON error observations rather than aborting.

pub mod context;
pub mod definitions;
pub mod filesystem;
pub mod semantic;

use docweave_core::errors::{RetrievalError, StorageError};
use docweave_core::models::ToolCall;
use serde::Deserialize;
use serde_json::{json, Value};

pub use context::{ToolContext, ToolOutput};
pub use definitions::definitions_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKind {
    ListFiles,
    ReadFile,
    GetSymbols,
    GetImports,
    GetDefinition,
    GetReferences,
    GetStructure,
    SearchText,
    FinishExploration,
}

impl ToolKind {
    /// Every tool, available during exploration.
    pub const ALL: [ToolKind; 9] = [
        ToolKind::ListFiles,
        ToolKind::ReadFile,
        ToolKind::GetSymbols,
        ToolKind::GetImports,
        ToolKind::GetDefinition,
        ToolKind::GetReferences,
        ToolKind::GetStructure,
        ToolKind::SearchText,
        ToolKind::FinishExploration,
    ];

    /// Tools available while drafting a section.
    pub const SECTION: [ToolKind; 5] = [
        ToolKind::ReadFile,
        ToolKind::GetSymbols,
        ToolKind::GetStructure,
        ToolKind::GetImports,
        ToolKind::SearchText,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListFiles => "list_files",
            Self::ReadFile => "read_file",
            Self::GetSymbols => "get_symbols",
            Self::GetImports => "get_imports",
            Self::GetDefinition => "get_definition",
            Self::GetReferences => "get_references",
            Self::GetStructure => "get_structure",
            Self::SearchText => "search_text",
            Self::FinishExploration => "finish_exploration",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// A parsed tool invocation. Argument names match the JSON schemas in
/// `definitions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "tool", content = "arguments", rename_all = "snake_case")]
pub enum ToolRequest {
    ListFiles {
        pattern: String,
        #[serde(default)]
        path: Option<String>,
    },
    ReadFile {
        path: String,
        #[serde(default)]
        start_line: Option<u32>,
        #[serde(default)]
        end_line: Option<u32>,
    },
    GetSymbols {
        path: String,
        #[serde(default)]
        kind: Option<String>,
    },
    GetImports {
        path: String,
    },
    GetDefinition {
        name: String,
    },
    GetReferences {
        name: String,
    },
    GetStructure {
        path: String,
    },
    SearchText {
        query: String,
    },
    FinishExploration {
        #[serde(default)]
        understanding: String,
    },
}

impl ToolRequest {
    /// Parse a model tool call. Blank argument strings count as `{}`.
    pub fn parse(call: &ToolCall) -> Result<Self, ToolError> {
        let kind = ToolKind::from_name(&call.name).ok_or_else(|| ToolError::UnknownTool {
            name: call.name.clone(),
        })?;
        let arguments: Value = if call.arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(&call.arguments).map_err(|e| ToolError::BadArguments {
                tool: kind.name().to_string(),
                reason: e.to_string(),
            })?
        };
        serde_json::from_value(json!({ "tool": kind.name(), "arguments": arguments })).map_err(
            |e| ToolError::BadArguments {
                tool: kind.name().to_string(),
                reason: e.to_string(),
            },
        )
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Self::ListFiles { .. } => ToolKind::ListFiles,
            Self::ReadFile { .. } => ToolKind::ReadFile,
            Self::GetSymbols { .. } => ToolKind::GetSymbols,
            Self::GetImports { .. } => ToolKind::GetImports,
            Self::GetDefinition { .. } => ToolKind::GetDefinition,
            Self::GetReferences { .. } => ToolKind::GetReferences,
            Self::GetStructure { .. } => ToolKind::GetStructure,
            Self::SearchText { .. } => ToolKind::SearchText,
            Self::FinishExploration { .. } => ToolKind::FinishExploration,
        }
    }
}

/// A tool failure, reported back to the model as an observation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("tool {tool} is not available here")]
    NotAllowed { tool: String },

    #[error("bad arguments for {tool}: {reason}")]
    BadArguments { tool: String, reason: String },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("path escapes the repository root: {path}")]
    PathEscape { path: String },

    #[error("cannot read binary file: {path}")]
    BinaryFile { path: String },

    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("symbol not found: {name}")]
    SymbolNotFound { name: String },

    #[error("invalid glob pattern {pattern}: {reason}")]
    BadPattern { pattern: String, reason: String },

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("store failed: {0}")]
    Storage(#[from] StorageError),
}

impl ToolError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTool { .. } => "unknown_tool",
            Self::NotAllowed { .. } => "not_allowed",
            Self::BadArguments { .. } => "bad_arguments",
            Self::FileNotFound { .. } => "file_not_found",
            Self::PathEscape { .. } => "path_escape",
            Self::BinaryFile { .. } => "binary_file",
            Self::Unreadable { .. } => "unreadable",
            Self::SymbolNotFound { .. } => "symbol_not_found",
            Self::BadPattern { .. } => "bad_pattern",
            Self::Retrieval(_) | Self::Storage(_) => "internal",
        }
    }

    pub fn to_observation(&self) -> Value {
        json!({ "error": self.to_string(), "code": self.code() })
    }
}
