//! Prompt text for each phase.

use docweave_core::models::{Citation, CitationVerdict, Section};

/// Marker placed in the transcript when a loop runs out of steps.
pub const MAX_STEPS_MARKER: &str = "Max steps reached";

pub const EXPLORATION_SYSTEM: &str = "You are a technical writer exploring a codebase so you can document it.

Learn enough about the repository to write the documentation the user asks for. Your tools:
- list_files(pattern, path): files matching a glob pattern
- read_file(path, start_line, end_line): file content
- get_symbols(path, kind): functions, classes and methods in a file
- get_imports(path): modules a file imports
- get_definition(name): where a symbol is defined
- get_references(name): where a symbol is used
- get_structure(path): structural overview of a file
- search_text(query): full-text search over the indexed code
- finish_exploration(understanding): stop exploring

Work outside-in. Start from entry points such as the README and main modules, follow imports to the components they depend on, and use get_structure before reading whole files. Aim for the architecture, not every line.

When you know enough to write the requested documentation, call finish_exploration with a summary of what you learned.";

pub const OUTLINE_SYSTEM: &str = "You are a technical writer planning a document.

From what was learned about the codebase, produce the outline as a JSON array. Each element has:
- title: the section title
- focus: what the section covers
- relevant_files: repository files the section should cite
- parent: optional title of an earlier top-level section this one nests under

Example:
[
  {\"title\": \"Overview\", \"focus\": \"High-level architecture\", \"relevant_files\": [\"README.md\"]},
  {\"title\": \"Request handling\", \"focus\": \"How requests flow through the server\", \"relevant_files\": [\"src/server.py\"]}
]

Reply with the JSON array only.";

pub const SECTION_SYSTEM: &str = "You are a technical writer drafting one section of a document about a codebase.

Write the section from the context provided. If it is not enough, these tools are available:
- read_file(path): file content
- get_symbols(path, kind): functions and classes in a file
- get_structure(path): structural overview of a file
- get_imports(path): modules a file imports
- search_text(query): full-text search over the indexed code

Rules:
1. Cite every statement about the code as [path:start_line-end_line], for example \"The Router class dispatches requests [src/router.py:12-40].\"
2. Describe only what the code shows.
3. Use markdown.
4. Do not repeat earlier sections.
5. Stay on this section's focus.
6. Read more files if the context is insufficient.
7. When you have enough, write the section and stop calling tools.";

pub fn exploration_user(prompt: &str) -> String {
    format!(
        "Documentation task:\n\n{prompt}\n\nExplore the codebase and call finish_exploration when ready."
    )
}

pub fn outline_user(prompt: &str, understanding: &str, files: &[String]) -> String {
    let files_list: String = files.iter().map(|f| format!("- {f}\n")).collect();
    format!(
        "Documentation task:\n{prompt}\n\nUnderstanding from exploration:\n{understanding}\n\nFiles explored:\n{files_list}\nCreate the JSON outline for this documentation."
    )
}

pub fn section_user(section: &Section, prompt: &str, context: &str, previous: &str) -> String {
    format!(
        "Documentation task: {prompt}\n\nSection to write:\nTitle: {}\nFocus: {}\n\nContext from relevant files:\n{context}\n{previous}\n\nWrite this section with citations in [path:start_line-end_line] format.",
        section.title, section.focus
    )
}

/// First lines of the sections already written, so the model does not
/// repeat them.
pub fn previous_summary(previous: &[String]) -> String {
    let heads: Vec<&str> = previous
        .iter()
        .filter_map(|text| text.trim().lines().next())
        .collect();
    if heads.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nPrevious sections covered:\n");
    for head in heads {
        out.push_str("- ");
        out.push_str(head);
        out.push('\n');
    }
    out
}

/// System prompt addendum listing the citations that failed verification.
pub fn citation_fix(failures: &[(&Citation, &CitationVerdict)]) -> String {
    let list: String = failures
        .iter()
        .map(|(c, v)| format!("- [{c}]: {} ({})\n", v.reason, v.label()))
        .collect();
    format!(
        "\n\nIMPORTANT: your previous draft had citations that failed verification:\n{list}
Typical causes:
- citing a file you never read (read_file it first)
- line numbers that do not hold the code described
- lines past the end of the file

Check the file and its line numbers before each claim. get_structure(path) lists definitions with their line ranges."
    )
}

/// System prompt addendum listing factual sentences that carried no
/// citation.
pub fn uncited_fix(sentences: &[String]) -> String {
    let list: String = sentences.iter().map(|s| format!("- {s}\n")).collect();
    format!(
        "\n\nIMPORTANT: these sentences in your previous draft make claims about the code without a citation:\n{list}
Add a [path:start_line-end_line] citation to each, or remove the claim."
    )
}

/// System prompt addendum for a draft whose citations reach too few of
/// the definitions in its relevant files.
pub fn coverage_fix(referenced: usize, total: usize, missing: &[String]) -> String {
    let mut text = format!(
        "\n\nIMPORTANT: your previous draft cited only {referenced} of the {total} definitions in this section's files."
    );
    if !missing.is_empty() {
        text.push_str(" Definitions never cited:\n");
        for name in missing {
            text.push_str("- ");
            text.push_str(name);
            text.push('\n');
        }
    }
    text.push_str("\nDescribe the important ones and cite the lines that define them.");
    text
}

pub fn final_turn() -> String {
    format!("{MAX_STEPS_MARKER}. Respond now with your final answer, without calling tools.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_core::models::{ClaimType, Severity};

    #[test]
    fn previous_summary_takes_first_lines() {
        assert_eq!(previous_summary(&[]), "");
        let summary = previous_summary(&[
            "## Overview\nbody".to_string(),
            "\n\n## Storage\nmore".to_string(),
        ]);
        assert!(summary.contains("- ## Overview\n"));
        assert!(summary.contains("- ## Storage\n"));
    }

    #[test]
    fn citation_fix_lists_each_failure() {
        let citation = Citation {
            id: 0,
            path: "config.py".to_string(),
            start_line: 40,
            end_line: 45,
            claim_text: "parseConfig validates".to_string(),
            section_id: 1,
        };
        let verdict = CitationVerdict::invalid(
            0,
            ClaimType::Extractive,
            Severity::Major,
            "parseConfig does not appear in the cited lines",
        );
        let text = citation_fix(&[(&citation, &verdict)]);
        assert!(text.contains("- [config.py:40-45]: parseConfig does not appear in the cited lines (major)"));
    }
}
