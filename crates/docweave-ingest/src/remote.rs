//! Remote repositories: shallow clones into a local cache via git2.

use std::path::{Path, PathBuf};

use docweave_core::errors::IngestError;
use git2::build::RepoBuilder;
use git2::{FetchOptions, Repository};
use tracing::info;

use crate::scanner::hasher::hash_content;

/// Whether a repository argument names a remote rather than a local path.
pub fn is_remote_url(target: &str) -> bool {
    ["https://", "http://", "ssh://", "git://", "git@"]
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

/// Last path segment of a URL or path, without a `.git` suffix.
pub fn repo_name(target: &str) -> String {
    let trimmed = target.trim_end_matches('/');
    let last = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "repo".to_string()
    } else {
        name.to_string()
    }
}

/// `<cache>/repos/<name>-<hash>`; stable per URL.
pub fn clone_dir(cache: &Path, url: &str) -> PathBuf {
    cache
        .join("repos")
        .join(format!("{}-{:08x}", repo_name(url), hash_content(url.as_bytes()) as u32))
}

/// Shallow-clone `url` into the cache, reusing an existing checkout.
pub fn clone_repo(url: &str, cache: &Path) -> Result<PathBuf, IngestError> {
    let dest = clone_dir(cache, url);
    let clone_err = |reason: String| IngestError::CloneFailed {
        url: url.to_string(),
        reason,
    };

    if dest.join(".git").is_dir() {
        Repository::open(&dest).map_err(|e| clone_err(e.message().to_string()))?;
        info!(url, dest = %dest.display(), "reusing cached clone");
        return Ok(dest);
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| clone_err(e.to_string()))?;
    }
    let mut fetch = FetchOptions::new();
    fetch.depth(1);
    RepoBuilder::new()
        .fetch_options(fetch)
        .clone(url, &dest)
        .map_err(|e| clone_err(e.message().to_string()))?;
    info!(url, dest = %dest.display(), "cloned repository");
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_remote_urls() {
        assert!(is_remote_url("https://github.com/org/project.git"));
        assert!(is_remote_url("git@github.com:org/project.git"));
        assert!(!is_remote_url("./project"));
        assert!(!is_remote_url("/home/me/project"));
    }

    #[test]
    fn names_from_urls_and_paths() {
        assert_eq!(repo_name("https://github.com/org/project.git"), "project");
        assert_eq!(repo_name("git@github.com:org/tool.git"), "tool");
        assert_eq!(repo_name("/home/me/app/"), "app");
    }

    #[test]
    fn clone_dir_is_stable() {
        let cache = Path::new("/tmp/cache");
        let a = clone_dir(cache, "https://example.com/x/y.git");
        assert_eq!(a, clone_dir(cache, "https://example.com/x/y.git"));
        assert_ne!(a, clone_dir(cache, "https://example.com/z/y.git"));
        assert!(a.to_string_lossy().contains("/repos/y-"));
    }
}
