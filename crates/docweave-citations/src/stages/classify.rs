//! Stage 4: claim classification, plus the anchor check that catches a
//! claim naming code the cited span never mentions.

use docweave_core::models::{CitationVerdict, ClaimType, Severity};

use crate::terms::{anchors, overlap_ratio, terms};

/// Extractive when the share of claim terms found in the span reaches
/// `threshold`, abstractive otherwise.
pub fn classify_claim(claim: &str, span: &str, threshold: f64) -> ClaimType {
    if overlap_ratio(&terms(claim), &terms(span)) >= threshold {
        ClaimType::Extractive
    } else {
        ClaimType::Abstractive
    }
}

/// `invalid`/`major` when the claim names identifiers and the span
/// contains none of them.
pub fn check_anchors(citation_id: usize, claim: &str, span: &str) -> Option<CitationVerdict> {
    let named = anchors(claim);
    if named.is_empty() || named.iter().any(|a| span.contains(a.as_str())) {
        return None;
    }
    Some(CitationVerdict::invalid(
        citation_id,
        ClaimType::Extractive,
        Severity::Major,
        format!("cited span does not mention {}", named.join(", ")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAN: &str = "def load_config(path):\n    with open(path) as f:\n        return parse(f.read())";

    #[test]
    fn restatement_is_extractive() {
        assert_eq!(
            classify_claim("load_config opens the path and returns parse of read", SPAN, 0.5),
            ClaimType::Extractive
        );
    }

    #[test]
    fn interpretation_is_abstractive() {
        assert_eq!(
            classify_claim("Configuration is centralized to keep startup predictable", SPAN, 0.5),
            ClaimType::Abstractive
        );
    }

    #[test]
    fn missing_anchor_is_major() {
        let verdict = check_anchors(3, "`parseConfig` validates required fields", SPAN).unwrap();
        assert_eq!(verdict.citation_id, 3);
        assert_eq!(verdict.severity, Severity::Major);
        assert!(verdict.reason.contains("parseConfig"));
    }

    #[test]
    fn present_or_absent_anchors_pass() {
        assert!(check_anchors(0, "`load_config` reads the file", SPAN).is_none());
        assert!(check_anchors(0, "The loader reads the file", SPAN).is_none());
    }
}
