//! The verification stages, in pipeline order.

pub mod aggregate;
pub mod classify;
pub mod coverage;
pub mod extract;
pub mod extractive;
pub mod judge;
pub mod structure;
