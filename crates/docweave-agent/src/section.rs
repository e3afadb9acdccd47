//! Section drafting: pre-gathered context, the section tool subset, and
//! rejection of drafts with uncited factual sentences.

use std::collections::BTreeSet;

use docweave_citations::uncited_sentences;
use docweave_core::config::Budgets;
use docweave_core::errors::AgentError;
use docweave_core::models::{Section, SymbolKind};
use docweave_core::traits::{CancellationToken, ILanguageModel};
use tracing::{debug, info, warn};

use crate::agent_loop::{AgentLoop, LoopState};
use crate::prompts;
use crate::tools::{ToolContext, ToolKind};

/// Lines of each relevant file shown up front.
const PREVIEW_LINES: usize = 100;

/// Extra steps granted when redrafting against verification feedback.
const CORRECTION_EXTRA_STEPS: u32 = 2;

/// A section draft and how it was reached.
#[derive(Debug, Clone)]
pub struct Draft {
    pub text: String,
    /// Factual sentences still lacking a citation after every retry.
    pub uncited: Vec<String>,
    /// Loop runs used, including uncited-sentence retries.
    pub attempts: u32,
    pub state: LoopState,
    pub model_calls: u32,
    pub files_read: BTreeSet<String>,
}

pub struct SectionGenerator<'a> {
    model: &'a dyn ILanguageModel,
    tools: &'a ToolContext<'a>,
    cancel: &'a CancellationToken,
    budgets: Budgets,
}

impl<'a> SectionGenerator<'a> {
    pub fn new(
        model: &'a dyn ILanguageModel,
        tools: &'a ToolContext<'a>,
        cancel: &'a CancellationToken,
        budgets: Budgets,
    ) -> Self {
        Self {
            model,
            tools,
            cancel,
            budgets,
        }
    }

    /// Structure plus the first lines of each relevant file. Files that
    /// are missing or outside the root are skipped.
    pub fn build_context(&self, section: &Section) -> String {
        let retrieval = self.tools.retrieval();
        let mut parts: Vec<String> = Vec::new();
        for path in &section.relevant_files {
            let rel = match self.tools.cached_path(path) {
                Ok(rel) => rel,
                Err(e) => {
                    debug!(path = %path, error = %e, "skipping context file");
                    continue;
                }
            };
            let Ok(text) = std::fs::read_to_string(self.tools.root().join(&rel)) else {
                continue;
            };
            let imports = retrieval.get_imports(&rel).unwrap_or_default();
            let structure = retrieval.get_structure(&rel).unwrap_or_default();
            let names = |kinds: &[SymbolKind]| -> Vec<String> {
                structure
                    .iter()
                    .filter(|s| kinds.contains(&s.kind))
                    .map(|s| format!("{} ({}-{})", s.name, s.start_line, s.end_line))
                    .collect()
            };

            let mut part = format!("## {rel}\n");
            part.push_str(&format!("Imports: {}\n", imports.join(", ")));
            part.push_str(&format!(
                "Classes: {}\n",
                names(&[SymbolKind::Class, SymbolKind::Type]).join(", ")
            ));
            part.push_str(&format!(
                "Functions: {}\n",
                names(&[SymbolKind::Function]).join(", ")
            ));
            let lines: Vec<&str> = text.lines().collect();
            let shown = lines.len().min(PREVIEW_LINES);
            part.push_str(&format!("\nFirst {shown} of {} lines:\n```\n", lines.len()));
            for (i, line) in lines.iter().take(shown).enumerate() {
                part.push_str(&format!("{:>4} | {line}\n", i + 1));
            }
            part.push_str("```\n");
            parts.push(part);
        }
        parts.join("\n")
    }

    /// Draft `section`. `corrections`, when present, is appended to the
    /// system prompt and grants extra steps. Drafts with uncited factual
    /// sentences are redrafted up to `max_uncited_retries` times; the last
    /// draft is kept either way.
    pub fn generate(
        &self,
        section: &Section,
        prompt: &str,
        previous: &[String],
        corrections: Option<&str>,
    ) -> Result<Draft, AgentError> {
        let context = self.build_context(section);
        let user = prompts::section_user(section, prompt, &context, &prompts::previous_summary(previous));
        let mut max_steps = self.budgets.max_section_steps;
        let mut base_system = prompts::SECTION_SYSTEM.to_string();
        if let Some(notes) = corrections {
            base_system.push_str(notes);
            max_steps += CORRECTION_EXTRA_STEPS;
        }

        let agent = AgentLoop::new(self.model, self.tools, self.cancel)
            .with_tools(&ToolKind::SECTION)
            .with_max_steps(max_steps);

        let mut system = base_system.clone();
        let mut draft = Draft {
            text: String::new(),
            uncited: Vec::new(),
            attempts: 0,
            state: LoopState::Exploring,
            model_calls: 0,
            files_read: BTreeSet::new(),
        };
        loop {
            let outcome = agent.run(&system, &user)?;
            draft.attempts += 1;
            draft.model_calls += outcome.steps;
            draft.files_read.extend(outcome.files_read);
            draft.state = outcome.state;
            if outcome.state == LoopState::Cancelled {
                return Ok(draft);
            }
            draft.text = outcome.text;
            draft.uncited = uncited_sentences(&draft.text);

            if draft.uncited.is_empty() {
                break;
            }
            if draft.attempts > self.budgets.max_uncited_retries {
                warn!(
                    section = section.id,
                    uncited = draft.uncited.len(),
                    "keeping draft with uncited sentences"
                );
                break;
            }
            debug!(section = section.id, uncited = draft.uncited.len(), "redrafting uncited sentences");
            system = format!("{base_system}{}", prompts::uncited_fix(&draft.uncited));
        }

        info!(
            section = section.id,
            title = %section.title,
            attempts = draft.attempts,
            model_calls = draft.model_calls,
            "section drafted"
        );
        Ok(draft)
    }
}
