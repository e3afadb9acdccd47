//! Scanner subsystem: ignore-aware file discovery, content hashing, and
//! binary detection.

pub mod binary;
pub mod hasher;
pub mod paths;
pub mod walker;

pub use paths::normalize_relative;
pub use walker::{walk_repository, WalkEntry};
