//! # docweave-report
//!
//! Turns an outline into a finished report: each section is drafted,
//! verified and gated on coverage AND validity, regenerated against its
//! failing verdicts within the iteration budget, then assembled into
//! markdown with a JSON metadata sidecar.

pub mod assembler;
pub mod complexity;
pub mod correction;
pub mod gate;
pub mod metadata;
pub mod runner;

pub use assembler::{assemble, report_title};
pub use complexity::{ComplexityAnalysis, ComplexityBucket};
pub use correction::{CorrectionLoop, SectionOutcome};
pub use gate::{evaluate, GateResult};
pub use metadata::{sidecar_path, write_report, ReportError, ReportMetadata, RunContext};
pub use runner::{ingest_and_plan, DocRunner, ExplorationSummary, RunPlan, RunReport};
