use serde::{Deserialize, Serialize};

/// Outcome of verifying one citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Valid,
    Invalid,
    /// The judge could not decide (error or timeout). Fails gating but is
    /// reported apart from `Invalid`.
    Unverifiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Extractive,
    Abstractive,
}

/// Severity taxonomy, ordered from harmless to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::None,
        Severity::Minor,
        Severity::Major,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationVerdict {
    pub citation_id: usize,
    pub status: VerdictStatus,
    pub claim_type: ClaimType,
    pub severity: Severity,
    pub reason: String,
}

impl CitationVerdict {
    pub fn valid(citation_id: usize, claim_type: ClaimType, reason: impl Into<String>) -> Self {
        Self {
            citation_id,
            status: VerdictStatus::Valid,
            claim_type,
            severity: Severity::None,
            reason: reason.into(),
        }
    }

    pub fn invalid(
        citation_id: usize,
        claim_type: ClaimType,
        severity: Severity,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            citation_id,
            status: VerdictStatus::Invalid,
            claim_type,
            severity,
            reason: reason.into(),
        }
    }

    /// Undecided, so it carries no severity.
    pub fn unverifiable(citation_id: usize, reason: impl Into<String>) -> Self {
        Self {
            citation_id,
            status: VerdictStatus::Unverifiable,
            claim_type: ClaimType::Abstractive,
            severity: Severity::None,
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == VerdictStatus::Valid
    }

    /// Severity, or `unverifiable` when the judge could not decide.
    pub fn label(&self) -> &'static str {
        match self.status {
            VerdictStatus::Unverifiable => "unverifiable",
            _ => self.severity.as_str(),
        }
    }
}
