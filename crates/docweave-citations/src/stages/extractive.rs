//! Stage 5: keyword verification of extractive claims. No model call.

use docweave_core::models::{CitationVerdict, ClaimType, Severity};

use crate::terms::{keywords, terms};

/// Deficits above this are major; smaller shortfalls are minor.
const MAJOR_DEFICIT: f64 = 0.3;

/// Valid when the share of claim keywords present in the span reaches
/// `threshold`. Otherwise invalid: critical when no keyword matches, major
/// when the shortfall exceeds 0.3, minor below that.
pub fn verify_extractive(
    citation_id: usize,
    claim: &str,
    span: &str,
    threshold: f64,
) -> CitationVerdict {
    let claim_keywords = keywords(claim);
    if claim_keywords.is_empty() {
        return CitationVerdict::valid(citation_id, ClaimType::Extractive, "no checkable keywords");
    }
    let span_terms = terms(span);
    let missing: Vec<&str> = claim_keywords
        .iter()
        .filter(|k| !span_terms.contains(*k))
        .map(String::as_str)
        .collect();
    let matched = claim_keywords.len() - missing.len();
    let ratio = matched as f64 / claim_keywords.len() as f64;

    if ratio >= threshold {
        return CitationVerdict::valid(
            citation_id,
            ClaimType::Extractive,
            format!("{matched}/{} keywords found in span", claim_keywords.len()),
        );
    }

    let severity = if matched == 0 {
        Severity::Critical
    } else if threshold - ratio > MAJOR_DEFICIT {
        Severity::Major
    } else {
        Severity::Minor
    };
    CitationVerdict::invalid(
        citation_id,
        ClaimType::Extractive,
        severity,
        format!(
            "only {matched}/{} claim keywords appear in the cited span (missing: {})",
            claim_keywords.len(),
            missing.join(", ")
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_core::models::VerdictStatus;

    const SPAN: &str = "fn open_store(path: &Path) -> Store {\n    Store::connect(path).with_pool(4)\n}";

    #[test]
    fn matching_keywords_pass() {
        let v = verify_extractive(0, "open_store connects the store at path with a pool", SPAN, 0.6);
        assert_eq!(v.status, VerdictStatus::Valid);
        assert_eq!(v.severity, Severity::None);
    }

    #[test]
    fn severity_scales_with_deficit() {
        let critical = verify_extractive(0, "Tokens expire after rotation", SPAN, 0.6);
        assert_eq!(critical.severity, Severity::Critical);

        // 1 of 4 keywords: deficit 0.35.
        let major = verify_extractive(0, "Store retries failed handshakes", SPAN, 0.6);
        assert_eq!(major.status, VerdictStatus::Invalid);
        assert_eq!(major.severity, Severity::Major);

        // 2 of 4 keywords: deficit 0.1.
        let minor = verify_extractive(0, "Store pool retries handshakes", SPAN, 0.6);
        assert_eq!(minor.severity, Severity::Minor);
        assert!(minor.reason.contains("missing"));
    }
}
