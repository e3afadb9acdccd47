use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Type,
    Variable,
    /// Synthetic per-file symbol that owns the file's import edges.
    Module,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Type => "type",
            Self::Variable => "variable",
            Self::Module => "module",
        }
    }

    /// Kinds that count as a definition for `get_definition`.
    pub fn is_definition(&self) -> bool {
        matches!(self, Self::Function | Self::Class | Self::Type | Self::Method)
    }

    /// Preference order when several symbols share a name (lower wins).
    pub fn definition_rank(&self) -> u8 {
        match self {
            Self::Class | Self::Type => 0,
            Self::Function => 1,
            Self::Method => 2,
            Self::Variable => 3,
            Self::Module => 4,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "function" => Ok(Self::Function),
            "method" => Ok(Self::Method),
            "class" => Ok(Self::Class),
            "type" => Ok(Self::Type),
            "variable" => Ok(Self::Variable),
            "module" => Ok(Self::Module),
            other => Err(format!("unknown symbol kind: {other}")),
        }
    }
}

/// A declared symbol, many-to-one with its chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub id: i64,
    pub chunk_id: i64,
    pub file_path: String,
    pub name: String,
    pub kind: SymbolKind,
    pub signature: String,
    /// Enclosing class or impl name for methods.
    pub parent: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
}

impl SymbolRecord {
    /// `path::Parent::name` style identifier used in reports.
    pub fn qualified_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}::{}::{}", self.file_path, parent, self.name),
            None => format!("{}::{}", self.file_path, self.name),
        }
    }
}
