//! Records shared across the pipeline.

pub mod chat;
pub mod chunk;
pub mod citation;
pub mod coverage;
pub mod degradation_event;
pub mod edge;
pub mod section;
pub mod skip;
pub mod symbol;
pub mod verdict;

pub use chat::{ChatMessage, ChatRequest, ChatResponse, Role, ToolCall, ToolDefinition};
pub use chunk::ChunkRecord;
pub use citation::Citation;
pub use coverage::CoverageReport;
pub use degradation_event::DegradationEvent;
pub use edge::{Direction, EdgeKind, EdgeRecord};
pub use section::{Section, SectionStatus};
pub use skip::{SkipReason, SkipRecord};
pub use symbol::{SymbolKind, SymbolRecord};
pub use verdict::{CitationVerdict, ClaimType, Severity, VerdictStatus};
