use std::fmt;

use serde::{Deserialize, Serialize};

/// A claim-to-source-span reference extracted from a section draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Position of the citation within its section, in text order.
    pub id: usize,
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    /// The sentence the citation supports.
    pub claim_text: String,
    pub section_id: usize,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.path, self.start_line, self.end_line)
    }
}
