use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Relationship kind between symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Imports,
    References,
    Defines,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imports => "imports",
            Self::References => "references",
            Self::Defines => "defines",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imports" => Ok(Self::Imports),
            "references" => Ok(Self::References),
            "defines" => Ok(Self::Defines),
            other => Err(format!("unknown edge kind: {other}")),
        }
    }
}

/// Traversal direction for edge lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Edges whose source is the symbol.
    Outgoing,
    /// Edges whose resolved target is the symbol.
    Incoming,
}

/// A directed edge in the symbol graph.
///
/// The target is either a resolved symbol id or, when nothing in the store
/// defines it, a dangling external name. `to_name` is always populated so
/// dangling and resolved edges can be matched by name alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: i64,
    pub from_symbol_id: i64,
    pub to_symbol_id: Option<i64>,
    pub to_name: String,
    pub kind: EdgeKind,
}

impl EdgeRecord {
    pub fn is_dangling(&self) -> bool {
        self.to_symbol_id.is_none()
    }
}
