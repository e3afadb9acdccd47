//! Term extraction shared by claim classification and verification.

use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "does", "each",
    "for", "from", "has", "have", "if", "in", "into", "is", "it", "its", "of", "on", "or",
    "that", "the", "their", "then", "there", "these", "this", "those", "to", "uses", "using",
    "via", "was", "were", "when", "which", "while", "with", "will", "within", "also", "all",
    "any", "both", "than", "so", "such", "they", "them", "we", "you", "not", "no", "one",
];

/// Crude suffix stripping so "validates", "validated" and "validate" meet.
fn stem(word: &str) -> String {
    if word.ends_with("ss") {
        return word.to_string();
    }
    let mut root = word;
    for suffix in ["ing", "ed", "s"] {
        if let Some(stripped) = root.strip_suffix(suffix) {
            if stripped.len() >= 3 {
                root = stripped;
                break;
            }
        }
    }
    if root.len() >= 4 {
        root = root.strip_suffix('e').unwrap_or(root);
    }
    root.to_string()
}

/// `parseConfig` -> `parse`, `Config`; `read_file` -> `read`, `file`.
fn identifier_parts(token: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for piece in token.split('_').filter(|p| !p.is_empty()) {
        let mut start = 0;
        let bytes = piece.as_bytes();
        for i in 1..bytes.len() {
            if bytes[i].is_ascii_uppercase() && bytes[i - 1].is_ascii_lowercase() {
                parts.push(&piece[start..i]);
                start = i;
            }
        }
        parts.push(&piece[start..]);
    }
    parts
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
}

fn collect(text: &str, skip_stopwords: bool) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut add = |word: &str| {
        let lower = word.to_lowercase();
        if lower.len() < 2 || (skip_stopwords && STOPWORDS.contains(&lower.as_str())) {
            return;
        }
        out.insert(stem(&lower));
    };
    for token in tokens(text) {
        add(token);
        for part in identifier_parts(token) {
            add(part);
        }
    }
    out
}

/// Lowercased, stemmed terms of `text`, identifiers split into parts.
/// Terms shorter than two characters are dropped.
pub fn terms(text: &str) -> BTreeSet<String> {
    collect(text, false)
}

/// Terms minus stopwords and numbers.
pub fn keywords(text: &str) -> BTreeSet<String> {
    collect(text, true)
        .into_iter()
        .filter(|t| t.len() >= 3)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .collect()
}

/// Share of `claim` terms present in `span` terms; zero for an empty claim.
pub fn overlap_ratio(claim: &BTreeSet<String>, span: &BTreeSet<String>) -> f64 {
    if claim.is_empty() {
        return 0.0;
    }
    claim.intersection(span).count() as f64 / claim.len() as f64
}

/// Code identifiers a claim names: backticked spans plus bare tokens in
/// camelCase or snake_case.
pub fn anchors(claim: &str) -> Vec<String> {
    let mut found = BTreeSet::new();
    let mut rest = claim;
    while let Some(open) = rest.find('`') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('`') else { break };
        for token in tokens(&after[..close]) {
            if token.chars().any(|c| c.is_alphabetic()) && token.len() >= 2 {
                found.insert(token.to_string());
            }
        }
        rest = &after[close + 1..];
    }
    for token in tokens(claim) {
        let snake = token.contains('_') && token.trim_matches('_').len() > 1;
        let camel = token
            .char_indices()
            .skip(1)
            .any(|(i, c)| c.is_ascii_uppercase() && token[..i].chars().any(|p| p.is_ascii_lowercase()))
            && token.chars().next().is_some_and(|c| c.is_ascii_lowercase());
        if snake || camel {
            found.insert(token.to_string());
        }
    }
    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_split_and_stem() {
        let t = terms("parseConfig validates required_fields");
        for expected in ["parseconfig", "pars", "config", "validat", "required_field", "requir", "field"] {
            assert!(t.contains(expected), "missing {expected} in {t:?}");
        }
    }

    #[test]
    fn keywords_drop_stopwords() {
        let k = keywords("The loader reads the file from disk in 4096 byte blocks");
        assert!(!k.contains("the"));
        assert!(!k.contains("4096"));
        assert!(k.contains("loader"));
        assert!(k.contains("read"));
        assert!(k.contains("disk"));
    }

    #[test]
    fn overlap_of_empty_claim_is_zero() {
        let span = terms("def alpha(): pass");
        assert_eq!(overlap_ratio(&BTreeSet::new(), &span), 0.0);
        assert_eq!(overlap_ratio(&terms("alpha"), &span), 1.0);
    }

    #[test]
    fn anchors_find_code_names() {
        let a = anchors("`parseConfig` calls load_file and then Validator.check.");
        assert_eq!(a, vec!["load_file".to_string(), "parseConfig".to_string()]);
        assert!(anchors("The module reads a file.").is_empty());
    }
}
