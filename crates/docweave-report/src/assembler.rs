//! Final markdown: a title from the prompt, then each section in outline
//! order.

use docweave_core::models::Section;

const DEFAULT_TITLE: &str = "Documentation";

/// First line of the prompt with leading `#` stripped.
pub fn report_title(prompt: &str) -> String {
    let first = prompt.trim().lines().next().unwrap_or_default();
    let title = first.trim_start_matches('#').trim();
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Sections keep their own heading when the draft starts with one;
/// otherwise top-level sections get `##` and children `###`. A section
/// with no text still appears, so no outline entry is silently dropped.
pub fn assemble(prompt: &str, sections: &[Section]) -> String {
    let mut out = format!("# {}\n\n", report_title(prompt));
    for section in sections {
        let body = section.draft_text.trim();
        if !body.starts_with('#') {
            let level = if section.parent_id.is_some() { "###" } else { "##" };
            out.push_str(&format!("{level} {}\n\n", section.title));
        }
        if body.is_empty() {
            out.push_str("_This section could not be generated._");
        } else {
            out.push_str(body);
        }
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: usize, title: &str, text: &str, parent: Option<usize>) -> Section {
        let mut s = Section::new(id, title, "");
        s.draft_text = text.to_string();
        s.parent_id = parent;
        s
    }

    #[test]
    fn title_from_first_prompt_line() {
        assert_eq!(report_title("## Architecture overview\nExplain it."), "Architecture overview");
        assert_eq!(report_title("  Describe the CLI  \nmore"), "Describe the CLI");
        assert_eq!(report_title(""), "Documentation");
        assert_eq!(report_title("###\nbody"), "Documentation");
    }

    #[test]
    fn headings_follow_hierarchy() {
        let report = assemble(
            "# Guide",
            &[
                section(0, "Overview", "The tool reads files [a.py:1-3].", None),
                section(1, "Details", "Gamma holds items [b.py:4-8].", Some(0)),
                section(2, "Own heading", "## Custom\nBody.", None),
            ],
        );
        assert!(report.starts_with("# Guide\n\n## Overview\n\nThe tool reads files"));
        assert!(report.contains("### Details\n\nGamma holds items"));
        assert!(report.contains("## Custom\nBody."));
        assert!(!report.contains("## Own heading"));
    }

    #[test]
    fn empty_section_is_kept() {
        let report = assemble("Doc", &[section(0, "Failed", "", None)]);
        assert!(report.contains("## Failed\n\n_This section could not be generated._"));
    }
}
