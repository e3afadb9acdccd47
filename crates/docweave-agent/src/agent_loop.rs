//! The step-bounded tool-calling loop.
//!
//! Exploring -> (ToolCall <-> Observation)* -> Finished | BudgetExhausted |
//! Cancelled. Exploration and section drafting are the same loop with a
//! different prompt, tool subset and step budget.

use std::collections::BTreeSet;

use docweave_core::config::defaults::DEFAULT_MAX_EXPLORATION_STEPS;
use docweave_core::errors::AgentError;
use docweave_core::models::{ChatMessage, ChatRequest, ToolCall};
use docweave_core::traits::{Cancellable, CancellationToken, ILanguageModel};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::prompts::{self, MAX_STEPS_MARKER};
use crate::tools::{definitions_for, ToolContext, ToolError, ToolKind, ToolRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Exploring,
    Finished,
    BudgetExhausted,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub state: LoopState,
    /// Final text: the model's answer, the `finish_exploration`
    /// understanding, or the forced final turn after the budget ran out.
    pub text: String,
    /// Model turns taken, including the forced final turn.
    pub steps: u32,
    pub tool_calls: usize,
    /// Normalized paths successfully read with `read_file`.
    pub files_read: BTreeSet<String>,
    pub transcript: Vec<ChatMessage>,
}

impl AgentOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.state == LoopState::Cancelled
    }
}

pub struct AgentLoop<'a> {
    model: &'a dyn ILanguageModel,
    tools: &'a ToolContext<'a>,
    allowed: Vec<ToolKind>,
    max_steps: u32,
    cancel: &'a CancellationToken,
}

impl<'a> AgentLoop<'a> {
    /// A loop over every tool with the default exploration budget.
    pub fn new(
        model: &'a dyn ILanguageModel,
        tools: &'a ToolContext<'a>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            model,
            tools,
            allowed: ToolKind::ALL.to_vec(),
            max_steps: DEFAULT_MAX_EXPLORATION_STEPS,
            cancel,
        }
    }

    pub fn with_tools(mut self, kinds: &[ToolKind]) -> Self {
        self.allowed = kinds.to_vec();
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run to completion. Makes at most `max_steps + 1` model calls.
    pub fn run(&self, system: &str, user: &str) -> Result<AgentOutcome, AgentError> {
        let definitions = definitions_for(&self.allowed);
        let mut outcome = AgentOutcome {
            state: LoopState::Exploring,
            text: String::new(),
            steps: 0,
            tool_calls: 0,
            files_read: BTreeSet::new(),
            transcript: vec![ChatMessage::system(system), ChatMessage::user(user)],
        };

        while outcome.steps < self.max_steps {
            if self.cancel.is_cancelled() {
                info!(steps = outcome.steps, "agent loop cancelled");
                outcome.state = LoopState::Cancelled;
                return Ok(outcome);
            }
            let request =
                ChatRequest::new(outcome.transcript.clone()).with_tools(definitions.clone());
            let response = self.model.complete(&request)?;
            outcome.steps += 1;

            if !response.has_tool_calls() {
                outcome.text = response.text_or_empty().trim().to_string();
                outcome
                    .transcript
                    .push(ChatMessage::assistant(outcome.text.clone()));
                outcome.state = LoopState::Finished;
                debug!(steps = outcome.steps, "agent loop finished with text");
                return Ok(outcome);
            }

            outcome.transcript.push(ChatMessage::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                outcome.tool_calls += 1;
                match self.parse_allowed(call) {
                    Ok(ToolRequest::FinishExploration { understanding }) => {
                        outcome
                            .transcript
                            .push(ChatMessage::tool_result(call.id.clone(), "Exploration complete."));
                        outcome.text = understanding.trim().to_string();
                        outcome.state = LoopState::Finished;
                        info!(steps = outcome.steps, files = outcome.files_read.len(), "exploration finished");
                        return Ok(outcome);
                    }
                    Ok(request) => {
                        let observation = self.observe(&request, &mut outcome.files_read);
                        outcome
                            .transcript
                            .push(ChatMessage::tool_result(call.id.clone(), observation.to_string()));
                    }
                    Err(e) => {
                        debug!(tool = %call.name, error = %e, "rejected tool call");
                        outcome.transcript.push(ChatMessage::tool_result(
                            call.id.clone(),
                            e.to_observation().to_string(),
                        ));
                    }
                }
            }
        }

        if self.cancel.is_cancelled() {
            outcome.state = LoopState::Cancelled;
            return Ok(outcome);
        }
        warn!(max_steps = self.max_steps, "step budget exhausted, forcing a final answer");
        outcome.transcript.push(ChatMessage::user(prompts::final_turn()));
        let response = self
            .model
            .complete(&ChatRequest::new(outcome.transcript.clone()))?;
        outcome.steps += 1;
        let text = response.text_or_empty().trim();
        outcome.text = if text.is_empty() {
            MAX_STEPS_MARKER.to_string()
        } else {
            text.to_string()
        };
        outcome
            .transcript
            .push(ChatMessage::assistant(outcome.text.clone()));
        outcome.state = LoopState::BudgetExhausted;
        Ok(outcome)
    }

    fn parse_allowed(&self, call: &ToolCall) -> Result<ToolRequest, ToolError> {
        let request = ToolRequest::parse(call)?;
        if self.allowed.contains(&request.kind()) {
            Ok(request)
        } else {
            Err(ToolError::NotAllowed {
                tool: call.name.clone(),
            })
        }
    }

    fn observe(&self, request: &ToolRequest, files_read: &mut BTreeSet<String>) -> Value {
        match self.tools.execute(request) {
            Ok(output) => {
                if let Some(path) = output.file_read {
                    files_read.insert(path);
                }
                output.observation
            }
            Err(e) => {
                debug!(tool = request.kind().name(), error = %e, "tool failed");
                e.to_observation()
            }
        }
    }
}
