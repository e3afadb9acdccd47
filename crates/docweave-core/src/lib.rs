//! # docweave-core
//!
//! Foundation crate for the docweave pipeline.
//! Defines the shared records, errors, layered config, run budgets, and the
//! traits external capabilities (language model, embeddings) implement.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{DocweaveConfig, RunConfig};
pub use errors::PipelineError;
pub use traits::{Cancellable, CancellationToken};
