use serde::{Deserialize, Serialize};

use super::Citation;

/// Lifecycle of a report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Drafted,
    Gated,
    Final,
}

/// One report section: created by the outline, drafted and corrected, then
/// finalized by the assembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: usize,
    pub title: String,
    /// Parent section for a two-level hierarchy.
    pub parent_id: Option<usize>,
    /// What the section should cover.
    pub focus: String,
    pub relevant_files: Vec<String>,
    pub draft_text: String,
    pub citations: Vec<Citation>,
    pub status: SectionStatus,
}

impl Section {
    pub fn new(id: usize, title: impl Into<String>, focus: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            parent_id: None,
            focus: focus.into(),
            relevant_files: Vec::new(),
            draft_text: String::new(),
            citations: Vec::new(),
            status: SectionStatus::Drafted,
        }
    }
}
