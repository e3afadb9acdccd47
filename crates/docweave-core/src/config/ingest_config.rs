//! Ingestion configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Configuration for repository ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IngestConfig {
    /// Files larger than this (bytes) are skipped. Default: 1 MiB.
    pub max_file_size: Option<u64>,
    /// Extra ignore globs on top of `.gitignore` / `.ignore`.
    #[serde(default)]
    pub extra_ignore: Vec<String>,
    /// Follow symlinks while walking. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Include hidden files. Default: false.
    pub include_hidden: Option<bool>,
}

impl IngestConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(defaults::DEFAULT_MAX_FILE_SIZE)
    }

    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }

    pub fn effective_include_hidden(&self) -> bool {
        self.include_hidden.unwrap_or(false)
    }

    pub(crate) fn merge_from(&mut self, other: &IngestConfig) {
        if other.max_file_size.is_some() {
            self.max_file_size = other.max_file_size;
        }
        if !other.extra_ignore.is_empty() {
            self.extra_ignore = other.extra_ignore.clone();
        }
        if other.follow_symlinks.is_some() {
            self.follow_symlinks = other.follow_symlinks;
        }
        if other.include_hidden.is_some() {
            self.include_hidden = other.include_hidden;
        }
    }
}
