//! Query modules, one per table or concern. Each takes a `&Connection`
//! so the engine decides writer vs reader.

pub mod chunks;
pub mod edges;
pub mod export;
pub mod files;
pub mod search;
pub mod symbols;
