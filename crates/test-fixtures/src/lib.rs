//! Shared test helpers: on-disk fixture repositories and a scripted
//! language model that replays queued responses.
//!
//! Helpers panic on I/O failure; they are for tests only.

mod repo;
mod scripted_model;

pub use repo::FixtureRepo;
pub use scripted_model::ScriptedModel;

/// Numbered lines `prefix 1` .. `prefix n`, newline-terminated.
pub fn numbered_lines(prefix: &str, n: usize) -> String {
    (1..=n).map(|i| format!("{prefix} {i}\n")).collect()
}
