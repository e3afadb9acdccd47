//! Repository walk built on `ignore`, honoring .gitignore / .ignore and
//! extra glob excludes.

use std::path::{Path, PathBuf};

use docweave_core::config::IngestConfig;
use docweave_core::errors::IngestError;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use tracing::{debug, warn};

/// A non-ignored regular file found by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub absolute: PathBuf,
    /// Root-relative path with `/` separators.
    pub relative: String,
    pub size: u64,
}

/// Walk `root`, returning files sorted by relative path.
pub fn walk_repository(root: &Path, config: &IngestConfig) -> Result<Vec<WalkEntry>, IngestError> {
    let mut overrides = OverrideBuilder::new(root);
    for glob in &config.extra_ignore {
        // Overrides are whitelists unless negated.
        overrides
            .add(&format!("!{glob}"))
            .map_err(|e| IngestError::WalkFailed {
                reason: format!("bad ignore glob {glob}: {e}"),
            })?;
    }
    // `.git` is hidden, but include_hidden would otherwise expose it.
    overrides.add("!.git/").map_err(|e| IngestError::WalkFailed {
        reason: e.to_string(),
    })?;
    let overrides = overrides.build().map_err(|e| IngestError::WalkFailed {
        reason: e.to_string(),
    })?;

    let walker = WalkBuilder::new(root)
        .hidden(!config.effective_include_hidden())
        .follow_links(config.effective_follow_symlinks())
        .git_ignore(true)
        .git_exclude(true)
        .ignore(true)
        .require_git(false)
        .overrides(overrides)
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable walk entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let absolute = entry.path().to_path_buf();
        let Ok(rel) = absolute.strip_prefix(root) else {
            continue;
        };
        let relative = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        entries.push(WalkEntry {
            absolute,
            relative,
            size,
        });
    }
    entries.sort_by(|a, b| a.relative.cmp(&b.relative));
    debug!(root = %root.display(), files = entries.len(), "walk complete");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_gitignore_and_extra_globs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join(".gitignore"), "build/\n").unwrap();
        std::fs::create_dir_all(root.join("build")).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("build/out.py"), "x = 1\n").unwrap();
        std::fs::write(root.join("src/main.py"), "x = 1\n").unwrap();
        std::fs::write(root.join("src/gen.py"), "x = 1\n").unwrap();

        let config = IngestConfig {
            extra_ignore: vec!["src/gen.py".to_string()],
            ..Default::default()
        };
        let entries = walk_repository(root, &config).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.relative.as_str()).collect();
        assert_eq!(paths, vec!["src/main.py"]);
    }
}
