//! Git repository handling and URL parsing

use crate::error::FetchError;
use crate::system::System;
use crate::utils::path::resolve_user_path;
use anyhow::Result;
use std::path::PathBuf;

/// Where a repository is fetched from
#[derive(Debug, Clone)]
pub enum RepoSource {
    /// Remote repository with a URL git can clone
    Remote {
        /// Normalized URL for git operations
        normalized_url: String,
    },
    /// Repository on the local filesystem (still cloned, just without
    /// network I/O)
    Local {
        /// Resolved absolute path
        resolved_path: PathBuf,
    },
}

/// A repository source with URL normalization applied
#[derive(Debug, Clone)]
pub struct Repository {
    pub url: String,
    pub source: RepoSource,
}

impl Repository {
    /// Create a new repository from a URL, `org/repo` shorthand, or local path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL format is not recognized
    /// - A local path does not exist or is not a directory
    pub fn new(system: &dyn System, url: &str) -> Result<Self> {
        let source = detect_source(system, url)?;

        Ok(Self {
            url: url.to_owned(),
            source,
        })
    }

    /// The argument handed to `git clone`
    #[must_use]
    pub fn clone_url(&self) -> String {
        match &self.source {
            RepoSource::Remote { normalized_url } => normalized_url.clone(),
            RepoSource::Local { resolved_path } => resolved_path.display().to_string(),
        }
    }

    /// The URL exactly as the user provided it
    #[must_use]
    pub fn original_url(&self) -> &str {
        &self.url
    }

    /// Check if this source lives on the local filesystem
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self.source, RepoSource::Local { .. })
    }
}

/// Decide whether the source is a remote URL or a local filesystem path
fn detect_source(system: &dyn System, url: &str) -> Result<RepoSource> {
    if let Some(path_str) = strip_local_prefix(url) {
        return create_local_source(system, url, path_str);
    }

    let normalized_url = normalize_remote_url(url)?;
    Ok(RepoSource::Remote { normalized_url })
}

/// Extract the path portion of a local source, if the string denotes one
///
/// `file:` and `file://` prefixes are explicit; bare absolute, relative,
/// and `~` paths are accepted as a convenience.
fn strip_local_prefix(url: &str) -> Option<&str> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(rest);
    }
    if let Some(rest) = url.strip_prefix("file:") {
        return Some(rest);
    }
    if url.starts_with('/') || url.starts_with("./") || url.starts_with("../") || url.starts_with('~')
    {
        return Some(url);
    }
    None
}

/// Resolve and validate a local repository path
fn create_local_source(system: &dyn System, original: &str, path_str: &str) -> Result<RepoSource> {
    let resolved_path = resolve_user_path(system, path_str)?;

    if !system.exists(&resolved_path) {
        return Err(FetchError::config(format!(
            "Local repository path does not exist: '{}' (from '{original}')",
            resolved_path.display()
        ))
        .into());
    }

    if !system.is_dir(&resolved_path) {
        return Err(FetchError::config(format!(
            "Local repository path is not a directory: '{}' (from '{original}')",
            resolved_path.display()
        ))
        .into());
    }

    Ok(RepoSource::Local { resolved_path })
}

/// Normalize a remote URL to a form suitable for `git clone`
fn normalize_remote_url(url: &str) -> Result<String> {
    if url.starts_with("https://") || url.starts_with("http://") {
        if url.ends_with(".git") {
            Ok(url.to_owned())
        } else {
            Ok(format!("{url}.git"))
        }
    } else if url.starts_with("git@") {
        // SSH URL - use as-is
        Ok(url.to_owned())
    } else if url.contains('/') && !url.contains(':') {
        // Short format: myorg/repo -> https://github.com/myorg/repo.git
        if url.matches('/').count() == 1 {
            Ok(format!("https://github.com/{url}.git"))
        } else {
            Err(FetchError::config(format!(
                "Invalid repository format: '{url}'. Expected format: 'org/repo'"
            ))
            .into())
        }
    } else {
        Err(FetchError::config(format!(
            "Unsupported repository URL format: '{url}'\n\
            Supported formats:\n\
            - Short: myorg/repo\n\
            - HTTPS: https://github.com/myorg/repo.git\n\
            - SSH: git@github.com:myorg/repo.git\n\
            - Local: file:///path/to/repo or /path/to/repo"
        ))
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn test_normalize_remote_url() {
        // Short format
        assert_eq!(
            normalize_remote_url("myorg/repo").unwrap(),
            "https://github.com/myorg/repo.git"
        );

        // HTTPS without .git
        assert_eq!(
            normalize_remote_url("https://github.com/openitools/openitools-ipcc").unwrap(),
            "https://github.com/openitools/openitools-ipcc.git"
        );

        // HTTPS with .git
        assert_eq!(
            normalize_remote_url("https://github.com/openitools/openitools-ipcc.git").unwrap(),
            "https://github.com/openitools/openitools-ipcc.git"
        );

        // SSH
        assert_eq!(
            normalize_remote_url("git@github.com:myorg/repo.git").unwrap(),
            "git@github.com:myorg/repo.git"
        );
    }

    #[test]
    fn test_invalid_remote_urls() {
        assert!(normalize_remote_url("invalid").is_err());
        assert!(normalize_remote_url("").is_err());
        assert!(normalize_remote_url("too/many/slashes").is_err());
    }

    #[test]
    fn detects_remote_sources() {
        let system = MockSystem::new();

        let repo = Repository::new(&system, "myorg/repo").unwrap();
        assert!(!repo.is_local());
        assert_eq!(repo.clone_url(), "https://github.com/myorg/repo.git");
        assert_eq!(repo.original_url(), "myorg/repo");

        let repo = Repository::new(&system, "git@github.com:myorg/repo.git").unwrap();
        assert!(!repo.is_local());
    }

    #[test]
    fn detects_local_sources() {
        let system = MockSystem::new().with_dir("/srv/mirrors/ipcc");

        let repo = Repository::new(&system, "file:///srv/mirrors/ipcc").unwrap();
        assert!(repo.is_local());
        assert_eq!(repo.clone_url(), "/srv/mirrors/ipcc");

        let repo = Repository::new(&system, "/srv/mirrors/ipcc").unwrap();
        assert!(repo.is_local());
    }

    #[test]
    fn local_relative_path_resolves_against_current_dir() {
        let system = MockSystem::new()
            .with_current_dir("/work")
            .with_dir("/work/mirror");

        let repo = Repository::new(&system, "./mirror").unwrap();
        assert!(repo.is_local());
        assert_eq!(repo.clone_url(), "/work/mirror");
    }

    #[test]
    fn local_source_must_exist_and_be_a_directory() {
        let system = MockSystem::new().with_file("/srv/not-a-dir", b"x");

        assert!(Repository::new(&system, "file:///srv/missing").is_err());
        assert!(Repository::new(&system, "file:///srv/not-a-dir").is_err());
    }
}
