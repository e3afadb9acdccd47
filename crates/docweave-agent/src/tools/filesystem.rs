//! `list_files` and `read_file`, plus the path guard every tool shares.

use std::path::Path;

use docweave_core::config::IngestConfig;
use docweave_ingest::language::Language;
use docweave_ingest::pipeline::FileOutcome;
use docweave_ingest::scanner::binary::is_binary;
use docweave_ingest::scanner::{normalize_relative, walk_repository};
use docweave_ingest::IngestPipeline;
use docweave_storage::StoreEngine;
use glob::{MatchOptions, Pattern};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::ToolError;

/// Listings longer than this are cut off and flagged `truncated`.
const MAX_LISTED_FILES: usize = 500;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Normalize a model-supplied path, rejecting anything outside the root.
pub fn resolve_path(path: &str) -> Result<String, ToolError> {
    match normalize_relative(path) {
        Some(rel) if !rel.is_empty() => Ok(rel),
        Some(_) => Err(ToolError::BadArguments {
            tool: "path".to_string(),
            reason: "path names the repository root, not a file".to_string(),
        }),
        None => Err(ToolError::PathEscape {
            path: path.to_string(),
        }),
    }
}

/// Non-ignored files under `path` whose path relative to `path` matches
/// `pattern`. Results are root-relative and sorted.
pub fn list_files(
    root: &Path,
    config: &IngestConfig,
    pattern: &str,
    path: Option<&str>,
) -> Result<Value, ToolError> {
    let base = normalize_relative(path.unwrap_or(".")).ok_or_else(|| ToolError::PathEscape {
        path: path.unwrap_or_default().to_string(),
    })?;
    let matcher = Pattern::new(pattern).map_err(|e| ToolError::BadPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let entries = walk_repository(root, config).map_err(|e| ToolError::Unreadable {
        path: base.clone(),
        reason: e.to_string(),
    })?;
    let prefix = if base.is_empty() {
        String::new()
    } else {
        format!("{base}/")
    };
    let matched: Vec<String> = entries
        .into_iter()
        .filter_map(|entry| {
            let below = entry.relative.strip_prefix(prefix.as_str())?;
            matcher
                .matches_with(below, MATCH_OPTIONS)
                .then_some(entry.relative)
        })
        .collect();

    let total = matched.len();
    let files: Vec<String> = matched.into_iter().take(MAX_LISTED_FILES).collect();
    debug!(pattern, base = %base, total, "list_files");
    Ok(json!({
        "files": files,
        "count": total,
        "truncated": total > MAX_LISTED_FILES,
    }))
}

/// Make sure `rel` is in the store, ingesting it when absent. Files that
/// exist but cannot be chunked are still readable, so only a missing file
/// is an error.
pub fn ensure_cached(
    root: &Path,
    store: &StoreEngine,
    ingest: &IngestPipeline,
    rel: &str,
) -> Result<(), ToolError> {
    if store.get_file(rel)?.is_some() {
        return Ok(());
    }
    if !root.join(rel).is_file() {
        return Err(ToolError::FileNotFound {
            path: rel.to_string(),
        });
    }
    match ingest.ingest_file(root, rel, store) {
        Ok(FileOutcome::Written { chunks, .. }) => {
            debug!(path = rel, chunks, "cached file on first read");
        }
        Ok(outcome) => debug!(path = rel, ?outcome, "file not cached"),
        Err(e) => warn!(path = rel, error = %e, "caching read file failed"),
    }
    Ok(())
}

/// Read a file (or a 1-indexed inclusive line range of it) from disk,
/// caching it into the store so later citations resolve.
pub fn read_file(
    root: &Path,
    store: &StoreEngine,
    ingest: &IngestPipeline,
    path: &str,
    start_line: Option<u32>,
    end_line: Option<u32>,
) -> Result<(String, Value), ToolError> {
    let rel = resolve_path(path)?;
    let absolute = root.join(&rel);
    if !absolute.is_file() {
        return Err(ToolError::FileNotFound { path: rel });
    }
    let bytes = std::fs::read(&absolute).map_err(|e| ToolError::Unreadable {
        path: rel.clone(),
        reason: e.to_string(),
    })?;
    if is_binary(&bytes) {
        return Err(ToolError::BinaryFile { path: rel });
    }
    ensure_cached(root, store, ingest, &rel)?;

    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let line_count = lines.len() as u32;
    let start = start_line.unwrap_or(1).max(1);
    let end = end_line.unwrap_or(line_count).min(line_count);
    let content = if start <= end {
        lines[(start - 1) as usize..end as usize].join("\n")
    } else {
        String::new()
    };
    let language = Language::from_path(Path::new(&rel))
        .map(|l| l.as_str())
        .unwrap_or("text");

    let observation = json!({
        "path": rel,
        "content": content,
        "language": language,
        "line_count": line_count,
        "start_line": start,
        "end_line": end,
    });
    Ok((rel, observation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_core::config::IngestConfig;
    use test_fixtures::FixtureRepo;

    fn pipeline() -> IngestPipeline {
        IngestPipeline::new(IngestConfig::default())
    }

    #[test]
    fn resolve_rejects_escapes_and_root() {
        assert_eq!(resolve_path("./src/../a.py").unwrap(), "a.py");
        assert_eq!(resolve_path("../x.py").unwrap_err().code(), "path_escape");
        assert_eq!(resolve_path("/etc/passwd").unwrap_err().code(), "path_escape");
        assert_eq!(resolve_path(".").unwrap_err().code(), "bad_arguments");
    }

    #[test]
    fn list_files_globs_relative_to_base() {
        let repo = FixtureRepo::new()
            .with_file("README.md", "# r\n")
            .with_file("src/main.py", "x = 1\n")
            .with_file("src/pkg/util.py", "y = 2\n")
            .with_file(".gitignore", "build/\n")
            .with_file("build/gen.py", "z = 3\n");
        let config = IngestConfig::default();

        let top = list_files(repo.path(), &config, "*.md", None).unwrap();
        assert_eq!(top["files"], json!(["README.md"]));

        let all_py = list_files(repo.path(), &config, "**/*.py", None).unwrap();
        assert_eq!(all_py["files"], json!(["src/main.py", "src/pkg/util.py"]));

        let under_src = list_files(repo.path(), &config, "*.py", Some("src")).unwrap();
        assert_eq!(under_src["files"], json!(["src/main.py"]));
        assert_eq!(under_src["truncated"], json!(false));

        assert_eq!(
            list_files(repo.path(), &config, "*", Some("../..")).unwrap_err().code(),
            "path_escape"
        );
        assert_eq!(
            list_files(repo.path(), &config, "[", None).unwrap_err().code(),
            "bad_pattern"
        );
    }

    #[test]
    fn read_file_caches_and_slices() {
        let repo = FixtureRepo::three_file();
        let store = StoreEngine::open_in_memory().unwrap();
        let ingest = pipeline();

        let (rel, obs) = read_file(repo.path(), &store, &ingest, "a.py", Some(4), Some(6)).unwrap();
        assert_eq!(rel, "a.py");
        assert_eq!(obs["line_count"], 10);
        assert_eq!(obs["language"], "python");
        assert!(obs["content"].as_str().unwrap().starts_with("def alpha(path):"));
        assert_eq!(obs["content"].as_str().unwrap().lines().count(), 3);
        assert!(store.get_file("a.py").unwrap().is_some());

        // Ranges past the end are clamped.
        let (_, obs) = read_file(repo.path(), &store, &ingest, "a.py", Some(9), Some(99)).unwrap();
        assert_eq!(obs["end_line"], 10);
    }

    #[test]
    fn read_file_failures() {
        let repo = FixtureRepo::three_file();
        let store = StoreEngine::open_in_memory().unwrap();
        let ingest = pipeline();
        let code = |p: &str| {
            read_file(repo.path(), &store, &ingest, p, None, None)
                .unwrap_err()
                .code()
        };
        assert_eq!(code("missing.py"), "file_not_found");
        assert_eq!(code("c.txt"), "binary_file");
        assert_eq!(code("../../etc/passwd"), "path_escape");
    }

    #[test]
    fn unsupported_files_are_readable_but_not_cached() {
        let repo = FixtureRepo::new().with_file("NOTES.md", "line one\nline two\n");
        let store = StoreEngine::open_in_memory().unwrap();
        let (_, obs) = read_file(repo.path(), &store, &pipeline(), "NOTES.md", None, None).unwrap();
        assert_eq!(obs["language"], "text");
        assert_eq!(obs["content"], "line one\nline two");
        assert!(store.get_file("NOTES.md").unwrap().is_none());
    }
}
