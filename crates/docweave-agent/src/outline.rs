//! Outline generation: one model call, parsed into sections.

use docweave_core::errors::AgentError;
use docweave_core::models::{ChatMessage, ChatRequest, Section};
use docweave_core::traits::ILanguageModel;
use docweave_llm::extract_json_array;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::prompts;

/// One element of the outline array the model returns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutlineItem {
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub relevant_files: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

fn untitled() -> String {
    "Untitled".to_string()
}

/// Parse an outline reply into at most `max_sections` sections.
///
/// Non-object elements are skipped. A reply with no usable sections yields
/// a single "Overview" section over `fallback_files`. `parent` links only
/// to an earlier top-level section, keeping the hierarchy two levels deep.
pub fn parse_outline(text: &str, max_sections: usize, fallback_files: &[String]) -> Vec<Section> {
    let items: Vec<OutlineItem> = extract_json_array(text)
        .and_then(|json| serde_json::from_str::<Vec<Value>>(json).ok())
        .unwrap_or_default()
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value::<OutlineItem>(v).ok())
        .collect();

    if items.is_empty() {
        warn!("outline reply held no sections, falling back to a single overview");
        let mut overview = Section::new(0, "Overview", "High-level overview of the codebase");
        overview.relevant_files = fallback_files.to_vec();
        return vec![overview];
    }

    let mut sections: Vec<Section> = Vec::with_capacity(items.len().min(max_sections));
    for (id, item) in items.into_iter().take(max_sections.max(1)).enumerate() {
        let parent_id = item.parent.as_deref().and_then(|parent| {
            sections
                .iter()
                .find(|s| s.parent_id.is_none() && s.title == parent)
                .map(|s| s.id)
        });
        let mut section = Section::new(id, item.title.trim(), item.focus);
        section.parent_id = parent_id;
        section.relevant_files = item.relevant_files;
        sections.push(section);
    }
    sections
}

pub struct OutlineGenerator<'a> {
    model: &'a dyn ILanguageModel,
}

impl<'a> OutlineGenerator<'a> {
    pub fn new(model: &'a dyn ILanguageModel) -> Self {
        Self { model }
    }

    pub fn generate(
        &self,
        prompt: &str,
        understanding: &str,
        files_explored: &[String],
        max_sections: usize,
    ) -> Result<Vec<Section>, AgentError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(prompts::OUTLINE_SYSTEM),
            ChatMessage::user(prompts::outline_user(prompt, understanding, files_explored)),
        ]);
        let response = self.model.complete(&request)?;
        let sections = parse_outline(response.text_or_empty(), max_sections, files_explored);
        info!(sections = sections.len(), "outline generated");
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_outline_with_hierarchy() {
        let text = r#"Here you go:
```json
[
  {"title": "Overview", "focus": "architecture", "relevant_files": ["README.md"]},
  {"title": "Storage", "focus": "the store", "relevant_files": ["src/store.py"], "parent": "Overview"},
  {"title": "Deep", "focus": "x", "parent": "Storage"},
  "stray string"
]
```"#;
        let sections = parse_outline(text, 20, &[]);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, "Overview");
        assert_eq!(sections[1].parent_id, Some(0));
        assert_eq!(sections[1].relevant_files, vec!["src/store.py"]);
        // Storage is itself a child, so Deep stays top-level.
        assert_eq!(sections[2].parent_id, None);
        assert!(sections[2].relevant_files.is_empty());
    }

    #[test]
    fn truncates_to_max_sections() {
        let text = r#"[{"title":"A"},{"title":"B"},{"title":"C"}]"#;
        let sections = parse_outline(text, 2, &[]);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(sections[1].id, 1);
    }

    #[test]
    fn malformed_outline_falls_back_to_overview() {
        let files = vec!["main.py".to_string()];
        for text in ["", "I could not decide.", "[{\"title\": 3", "[1, 2]"] {
            let sections = parse_outline(text, 20, &files);
            assert_eq!(sections.len(), 1, "{text}");
            assert_eq!(sections[0].title, "Overview");
            assert_eq!(sections[0].relevant_files, files);
        }
    }

    #[test]
    fn missing_title_is_untitled() {
        let sections = parse_outline(r#"[{"focus": "f"}]"#, 5, &[]);
        assert_eq!(sections[0].title, "Untitled");
        assert_eq!(sections[0].focus, "f");
    }
}
