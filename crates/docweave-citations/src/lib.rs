//! # docweave-citations
//!
//! Verifies the `[path:start-end]` citations of a drafted section.
//! Each stage is a public function under [`stages`]; [`CitationPipeline`]
//! runs them in order and returns one verdict per citation plus coverage.

pub mod pipeline;
pub mod stages;
pub mod terms;

pub use pipeline::{CitationPipeline, SectionVerification};
pub use stages::aggregate::{aggregate, VerificationSummary};
pub use stages::extract::{extract_citations, split_sentences, uncited_sentences};
pub use stages::judge::BatchedJudge;
pub use stages::structure::{validate_structure, Resolution, ResolvedSpan, SpanResolver};
