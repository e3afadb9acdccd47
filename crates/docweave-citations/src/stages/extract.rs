//! Stage 1: citation extraction, plus the sentence splitter the section
//! generator reuses to find uncited claims.

use std::sync::LazyLock;

use docweave_core::errors::CitationError;
use docweave_core::models::Citation;
use regex::Regex;

static CITATION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([^\]:]+):(\d+)-(\d+)\]").ok());

/// Sentences with fewer words than this are not treated as claims.
const MIN_CLAIM_WORDS: usize = 5;

fn citation_re() -> Result<&'static Regex, CitationError> {
    CITATION_RE.as_ref().ok_or_else(|| CitationError::Pattern {
        reason: "citation regex failed to compile".to_string(),
    })
}

/// A prose sentence with its byte range in the section text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Sentence {
    pub fn has_citation(&self) -> bool {
        CITATION_RE
            .as_ref()
            .is_some_and(|re| re.is_match(&self.text))
    }
}

/// Remove `[path:a-b]` markers and tidy the whitespace they leave.
pub fn strip_citations(text: &str) -> String {
    let stripped = match CITATION_RE.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    };
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" .", ".")
        .replace(" ,", ",")
}

fn strip_list_marker(piece: &str) -> &str {
    if !is_list_item(piece) {
        return piece;
    }
    let t = piece.trim_start();
    let marker = t.find(' ').map_or(0, |i| i + 1);
    t[marker..].trim_start()
}

fn is_list_item(line: &str) -> bool {
    let t = line.trim_start();
    if t.starts_with("- ") || t.starts_with("* ") || t.starts_with("+ ") {
        return true;
    }
    let digits = t.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && t[digits..].starts_with(". ")
}

/// Split prose into sentences. Headings, fenced code, and table rows are
/// skipped; list items start a new sentence; a fragment holding only
/// citations joins the sentence before it.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    let mut sentences: Vec<Sentence> = Vec::new();
    let mut in_fence = false;
    let mut offset = 0;
    let mut prev_prose_end: Option<usize> = None;

    for raw_line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            prev_prose_end = None;
            continue;
        }
        if in_fence
            || trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with('|')
        {
            prev_prose_end = None;
            continue;
        }

        let continues_paragraph = !is_list_item(line)
            && prev_prose_end.is_some_and(|end| {
                sentences
                    .last()
                    .is_some_and(|s| s.end == end && !ends_sentence(&s.text))
            });
        split_line(text, line_start, line, continues_paragraph, &mut sentences);
        prev_prose_end = Some(line_start + line.len());
    }

    sentences
}

fn ends_sentence(text: &str) -> bool {
    let t = text.trim_end();
    t.ends_with('.') || t.ends_with('!') || t.ends_with('?') || t.ends_with(':')
        || CITATION_RE
            .as_ref()
            .and_then(|re| re.find_iter(t).last())
            .is_some_and(|m| m.end() == t.len())
}

/// Cut one line at sentence punctuation outside brackets.
fn split_line(
    text: &str,
    line_start: usize,
    line: &str,
    continues: bool,
    out: &mut Vec<Sentence>,
) {
    let mut depth = 0usize;
    let mut seg_start = 0;
    let mut first = true;
    let bytes = line.as_bytes();

    let push = |start: usize, end: usize, first: bool, out: &mut Vec<Sentence>| {
        let (abs_start, abs_end) = (line_start + start, line_start + end);
        let piece = strip_list_marker(text[abs_start..abs_end].trim());
        if piece.is_empty() {
            return;
        }
        let citation_only = !strip_citations(piece).chars().any(char::is_alphanumeric);
        let join = (first && continues) || citation_only;
        match out.last_mut() {
            Some(prev) if join => {
                prev.end = abs_end;
                prev.text = strip_list_marker(text[prev.start..abs_end].trim()).to_string();
            }
            _ => out.push(Sentence {
                start: abs_start,
                end: abs_end,
                text: piece.to_string(),
            }),
        }
    };

    let marker_end = if is_list_item(line) {
        line.len() - line.trim_start().len() + line.trim_start().find(' ').unwrap_or(0)
    } else {
        0
    };

    for (i, &b) in bytes.iter().enumerate().skip(marker_end) {
        match b {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'.' | b'!' | b'?' if depth == 0 => {
                let next = bytes.get(i + 1);
                if next.map_or(true, |n| n.is_ascii_whitespace()) {
                    push(seg_start, i + 1, first, out);
                    first = false;
                    seg_start = i + 1;
                }
            }
            _ => {}
        }
    }
    if seg_start < line.len() {
        push(seg_start, line.len(), first, out);
    }
}

/// Every citation in text order, with the sentence it supports as claim.
pub fn extract_citations(section_id: usize, text: &str) -> Result<Vec<Citation>, CitationError> {
    let re = citation_re()?;
    let sentences = split_sentences(text);
    let mut citations = Vec::new();

    for caps in re.captures_iter(text) {
        let (Some(whole), Some(path), Some(start), Some(end)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let (Ok(start_line), Ok(end_line)) = (start.as_str().parse(), end.as_str().parse()) else {
            // Line numbers beyond u32 cannot name a real span.
            continue;
        };
        let claim = sentences
            .iter()
            .find(|s| s.start <= whole.start() && whole.end() <= s.end)
            .map(|s| s.text.as_str())
            .unwrap_or_else(|| enclosing_line(text, whole.start()));

        citations.push(Citation {
            id: citations.len(),
            path: path.as_str().trim().to_string(),
            start_line,
            end_line,
            claim_text: strip_citations(claim),
            section_id,
        });
    }
    Ok(citations)
}

fn enclosing_line(text: &str, at: usize) -> &str {
    let start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    let end = text[at..].find('\n').map_or(text.len(), |i| at + i);
    text[start..end].trim()
}

/// Factual sentences with no citation of their own.
pub fn uncited_sentences(text: &str) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|s| !s.has_citation())
        .map(|s| strip_citations(&s.text))
        .filter(|s| is_claim(s))
        .collect()
}

fn is_claim(sentence: &str) -> bool {
    let t = sentence.trim_end();
    !t.ends_with('?') && !t.ends_with(':') && t.split_whitespace().count() >= MIN_CLAIM_WORDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citations_carry_their_sentence() {
        let text = "The loader opens the file [src/io.rs:10-20]. It then parses headers [src/parse.rs:3-9] and checks them [src/parse.rs:12-14].";
        let citations = extract_citations(2, text).unwrap();
        assert_eq!(citations.len(), 3);
        assert_eq!(citations[0].path, "src/io.rs");
        assert_eq!((citations[0].start_line, citations[0].end_line), (10, 20));
        assert_eq!(citations[0].claim_text, "The loader opens the file.");
        assert_eq!(citations[1].claim_text, citations[2].claim_text);
        assert_eq!(citations[2].id, 2);
        assert!(citations.iter().all(|c| c.section_id == 2));
    }

    #[test]
    fn trailing_citation_joins_previous_sentence() {
        let text = "Requests are retried with exponential backoff. [llm/retry.rs:40-60]\n";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].has_citation());
        let citations = extract_citations(0, text).unwrap();
        assert_eq!(citations[0].claim_text, "Requests are retried with exponential backoff.");
    }

    #[test]
    fn wrapped_lines_form_one_sentence() {
        let text = "The store keeps one writer connection\nand a pool of readers [store.rs:1-9].\n";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].text.contains("pool of readers"));
    }

    #[test]
    fn headings_and_code_are_not_claims() {
        let text = "## Storage layer overview heading\n\n```rust\nfn main() { println!(\"hello there world\"); }\n```\n\nShort line.\n";
        assert!(split_sentences(text).iter().all(|s| s.text == "Short line."));
        assert!(uncited_sentences(text).is_empty());
    }

    #[test]
    fn uncited_factual_sentences_are_reported() {
        let text = "- The scanner walks the tree in parallel.\n- Hashes use xxh3 [scan.rs:1-4].\nWhat happens next?";
        assert_eq!(
            uncited_sentences(text),
            vec!["The scanner walks the tree in parallel.".to_string()]
        );
    }

    #[test]
    fn paths_with_dots_do_not_split() {
        let text = "Configuration lives in a TOML file parsed by the loader [config/loader.v2.py:1-30].";
        assert_eq!(split_sentences(text).len(), 1);
        assert_eq!(extract_citations(0, text).unwrap()[0].path, "config/loader.v2.py");
    }
}
