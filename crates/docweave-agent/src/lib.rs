//! # docweave-agent
//!
//! The model-facing half of the pipeline. A closed set of read-only tools
//! over the repository and store, one step-bounded tool-calling loop used
//! for both exploration and section drafting, and the outline and section
//! generators built on it.

pub mod agent_loop;
pub mod outline;
pub mod prompts;
pub mod section;
pub mod tools;

pub use agent_loop::{AgentLoop, AgentOutcome, LoopState};
pub use outline::{parse_outline, OutlineGenerator, OutlineItem};
pub use section::{Draft, SectionGenerator};
pub use tools::{ToolContext, ToolKind, ToolRequest};
