//! The clone -> configure -> patterns -> materialize pipeline

use crate::error::FetchError;
use crate::git::Repository;
use crate::git::patterns::SparsePatternSet;
use anyhow::{Context as _, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Performs a partial, pattern-filtered fetch of a Git repository into a
/// destination directory
///
/// The four steps run strictly in order and every git invocation receives
/// the repository path explicitly; the process working directory is never
/// changed.
#[non_exhaustive]
pub struct SparseFetch {
    pub repository: Repository,
    pub dest: PathBuf,
    pub patterns: SparsePatternSet,
    pub cone: bool,
    pub append: bool,
}

/// What a completed fetch produced
#[derive(Debug)]
pub struct FetchReport {
    pub dest: PathBuf,
    pub reused_repository: bool,
    pub files_materialized: usize,
}

/// How the destination looked before the clone step
enum DestinationState {
    Missing,
    EmptyDirectory,
    ExistingRepository,
}

impl SparseFetch {
    /// Create a new fetch operation
    #[must_use]
    #[inline]
    pub const fn new(
        repository: Repository,
        dest: PathBuf,
        patterns: SparsePatternSet,
        cone: bool,
        append: bool,
    ) -> Self {
        Self {
            repository,
            dest,
            patterns,
            cone,
            append,
        }
    }

    /// Execute the fetch pipeline
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The destination is occupied by something that is not a repository
    /// - The clone fails (network, auth, destination conflict)
    /// - The sparse-checkout mode or patterns cannot be configured
    /// - The tree cannot be materialized
    #[inline]
    pub fn execute(&self) -> Result<FetchReport> {
        debug!("Executing sparse fetch into {:?}", self.dest);

        // Step 1: Clone with filter and no checkout (or reuse an existing
        // repository, which is what makes re-runs idempotent)
        let reused_repository = match self.destination_state()? {
            DestinationState::ExistingRepository => {
                debug!("Destination already holds a repository, skipping clone");
                true
            }
            DestinationState::Missing | DestinationState::EmptyDirectory => {
                self.clone_repository()?;
                debug!("Repository cloned");
                false
            }
        };

        // Step 2: Configure the sparse-checkout mode
        self.configure_sparse_mode()?;
        debug!("Sparse checkout mode configured (cone: {})", self.cone);

        // Step 3: Write the pattern set
        self.write_patterns()?;
        debug!("Sparse checkout patterns written: {:?}", self.patterns.lines());

        // Step 4: Materialize the tree from HEAD
        self.materialize()?;
        debug!("Tree materialized");

        let files_materialized = match count_worktree_files(&self.dest) {
            Ok(count) => count,
            Err(e) => {
                debug!("Could not count materialized files: {e}");
                0
            }
        };

        Ok(FetchReport {
            dest: self.dest.clone(),
            reused_repository,
            files_materialized,
        })
    }

    /// Inspect the destination before cloning
    fn destination_state(&self) -> Result<DestinationState> {
        if !self.dest.exists() {
            return Ok(DestinationState::Missing);
        }

        if self.dest.join(".git").exists() {
            return Ok(DestinationState::ExistingRepository);
        }

        if !self.dest.is_dir() {
            return Err(FetchError::path_exists(format!(
                "Destination '{}' exists and is not a directory",
                self.dest.display()
            ))
            .into());
        }

        let mut entries = std::fs::read_dir(&self.dest).with_context(|| {
            format!("Failed to inspect destination '{}'", self.dest.display())
        })?;

        if entries.next().is_some() {
            return Err(FetchError::path_exists(format!(
                "Destination '{}' is a non-empty directory and not a repository",
                self.dest.display()
            ))
            .into());
        }

        Ok(DestinationState::EmptyDirectory)
    }

    /// Clone the repository with blob filter and no checkout
    fn clone_repository(&self) -> Result<()> {
        let dest = self.dest.to_str().ok_or_else(|| {
            anyhow::anyhow!("Failed to convert destination path to string")
        })?;
        let url = self.repository.clone_url();

        let output = Command::new("git")
            .args([
                "clone",
                "--filter=blob:none",
                "--no-checkout",
                url.as_str(),
                dest,
            ])
            .output()
            .context("Failed to execute git clone command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_clone_failure(
                self.repository.original_url(),
                stderr.trim(),
            )
            .into());
        }

        Ok(())
    }

    /// Set the sparse-checkout mode (cone or non-cone)
    fn configure_sparse_mode(&self) -> Result<()> {
        let mode = if self.cone { "--cone" } else { "--no-cone" };
        let output = self
            .git_in_dest(&["sparse-checkout", "init", mode])
            .context("Failed to execute git sparse-checkout init")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::config(format!(
                "sparse-checkout init step failed in '{}': {}",
                self.dest.display(),
                stderr.trim()
            ))
            .into());
        }

        Ok(())
    }

    /// Write the ordered pattern set, replacing or appending
    fn write_patterns(&self) -> Result<()> {
        let mut args: Vec<&str> = if self.append {
            vec!["sparse-checkout", "add"]
        } else if self.cone {
            vec!["sparse-checkout", "set", "--cone"]
        } else {
            vec!["sparse-checkout", "set", "--no-cone"]
        };
        args.extend(self.patterns.lines());

        let output = self
            .git_in_dest(&args)
            .context("Failed to execute git sparse-checkout set")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let verb = if self.append { "add" } else { "set" };
            return Err(FetchError::config(format!(
                "sparse-checkout {verb} step failed in '{}': {}",
                self.dest.display(),
                stderr.trim()
            ))
            .into());
        }

        Ok(())
    }

    /// Read the HEAD tree into index and working tree with merge/update
    /// semantics
    fn materialize(&self) -> Result<()> {
        let output = self
            .git_in_dest(&["read-tree", "-mu", "HEAD"])
            .context("Failed to execute git read-tree")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::materialization(format!(
                "read-tree materialization step failed in '{}': {}",
                self.dest.display(),
                stderr.trim()
            ))
            .into());
        }

        Ok(())
    }

    /// Run a git command with the destination as its working directory
    fn git_in_dest(&self, args: &[&str]) -> std::io::Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.dest)
            .output()
    }
}

/// Map a failed clone to the error taxonomy from git's stderr
///
/// The stderr text is carried verbatim so the user sees git's own message.
/// Unrecognized failures default to the network variant, the common case
/// for the clone phase.
fn classify_clone_failure(url: &str, stderr: &str) -> FetchError {
    let message = format!("clone step failed for '{url}': {stderr}");

    if stderr_matches(stderr, r"already exists and is not an empty directory") {
        return FetchError::path_exists(message);
    }

    if stderr_matches(
        stderr,
        r"(?i)authentication failed|permission denied|access denied|could not read (username|password)|invalid credentials|returned error: 40[13]|repository not found|access rights",
    ) {
        return FetchError::auth(message);
    }

    FetchError::network(message)
}

fn stderr_matches(stderr: &str, pattern: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(stderr))
}

/// Count the files in the materialized working tree, ignoring `.git`
fn count_worktree_files(dir: &Path) -> std::io::Result<usize> {
    let mut count = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if entry.file_name() == ".git" {
                continue;
            }
            count += count_worktree_files(&entry.path())?;
        } else {
            count += 1;
        }
    }

    Ok(count)
}

/// Check if Git is available and meets minimum version requirements
///
/// # Errors
///
/// Returns an error if:
/// - The Git command is not found
/// - The Git command failed to execute properly
/// - The Git version is too old
#[inline]
pub fn check_git_availability() -> Result<()> {
    let output = Command::new("git")
        .args(["--version"])
        .output()
        .context("Git command not found. Please ensure Git is installed and available in PATH")?;

    if !output.status.success() {
        return Err(FetchError::config("Git command failed to execute properly".to_owned()).into());
    }

    let version_output = String::from_utf8_lossy(&output.stdout);

    // Partial clone filters and the sparse-checkout command both need 2.25+
    if let Some(version_part) = version_output.split_whitespace().nth(2)
        && let Ok(version) = parse_git_version(version_part)
        && version < (2, 25, 0)
    {
        return Err(FetchError::config(format!(
            "Git version {version_part} is too old. fetch-sparse requires Git 2.25.0 or later for partial clone and sparse checkout support"
        ))
        .into());
    }

    Ok(())
}

/// Parse Git version string into tuple (major, minor, patch)
///
/// # Errors
///
/// Returns an error if:
/// - The version string is invalid
#[inline]
pub fn parse_git_version(version: &str) -> Result<(u32, u32, u32)> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() >= 3 {
        let major = parts[0].parse().context("Invalid major version")?;
        let minor = parts[1].parse().context("Invalid minor version")?;
        let patch = parts[2].parse().context("Invalid patch version")?;
        Ok((major, minor, patch))
    } else {
        Err(anyhow::anyhow!("Invalid version format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_failures_map_to_the_taxonomy() {
        let err = classify_clone_failure(
            "https://github.com/openitools/openitools-ipcc.git",
            "fatal: could not resolve host: github.com",
        );
        assert!(matches!(err, FetchError::Network { .. }));

        let err = classify_clone_failure(
            "git@github.com:openitools/private.git",
            "git@github.com: Permission denied (publickey).",
        );
        assert!(matches!(err, FetchError::Auth { .. }));

        let err = classify_clone_failure(
            "https://github.com/openitools/private.git",
            "remote: Repository not found.",
        );
        assert!(matches!(err, FetchError::Auth { .. }));

        let err = classify_clone_failure(
            "https://github.com/openitools/openitools-ipcc.git",
            "fatal: destination path 'ipcc' already exists and is not an empty directory.",
        );
        assert!(matches!(err, FetchError::PathExists { .. }));
    }

    #[test]
    fn unknown_clone_failures_default_to_network() {
        let err = classify_clone_failure("/tmp/missing", "fatal: repository '/tmp/missing' does not exist");
        assert!(matches!(err, FetchError::Network { .. }));
    }

    #[test]
    fn classified_errors_keep_stderr_verbatim() {
        let err = classify_clone_failure("x/y", "fatal: could not resolve host: github.com");
        assert!(
            err.to_string()
                .contains("fatal: could not resolve host: github.com")
        );
    }

    #[test]
    fn parse_git_version_tst() {
        assert_eq!(parse_git_version("2.34.1").unwrap(), (2, 34, 1));
        assert_eq!(parse_git_version("2.25.0").unwrap(), (2, 25, 0));
        parse_git_version("invalid").unwrap_err();
    }
}
