//! Path resolution and normalization utilities

use crate::error::FetchError;
use crate::system::System;
use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` components
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {
                // Skip '.' components
            }
            Component::ParentDir => {
                // Handle '..' by popping the last component if possible
                if components.is_empty() {
                    // Keep leading '..' components
                    components.push(component);
                } else {
                    components.pop();
                }
            }
            _ => {
                components.push(component);
            }
        }
    }

    components.iter().collect()
}

/// Resolve a user-supplied path to an absolute, normalized form
///
/// Expands a leading `~` using the `HOME` (or `USERPROFILE`) environment
/// variable and joins relative paths onto the current working directory.
///
/// # Errors
///
/// Returns an error if:
/// - The path starts with `~` but no home directory can be determined
/// - The current working directory cannot be read
pub fn resolve_user_path(system: &dyn System, raw: &str) -> Result<PathBuf> {
    let expanded = if raw.starts_with('~') {
        let home = system
            .env_var("HOME")
            .or_else(|_not_set| system.env_var("USERPROFILE"))
            .map_err(|_not_set| {
                FetchError::config(format!(
                    "Cannot determine home directory for ~ expansion in '{raw}'"
                ))
            })?;
        raw.replacen('~', &home, 1)
    } else {
        raw.to_owned()
    };

    let path = PathBuf::from(&expanded);
    let absolute = if path.is_absolute() {
        path
    } else {
        system
            .current_dir()
            .map_err(|e| FetchError::config(format!("Cannot get current directory: {e}")))?
            .join(&path)
    };

    Ok(normalize_path(&absolute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("./a/../b/./c")),
            PathBuf::from("b/c")
        );

        assert_eq!(normalize_path(Path::new("../a/b")), PathBuf::from("../a/b"));

        assert_eq!(normalize_path(Path::new("a/b/../..")), PathBuf::from(""));
    }

    #[test]
    fn resolve_relative_against_current_dir() {
        let system = MockSystem::new().with_current_dir("/work");
        let resolved = resolve_user_path(&system, "./out/repo").unwrap();
        assert_eq!(resolved, PathBuf::from("/work/out/repo"));
    }

    #[test]
    fn resolve_tilde_against_home() {
        let system = MockSystem::new().with_env("HOME", "/home/user");
        let resolved = resolve_user_path(&system, "~/repos/ipcc").unwrap();
        assert_eq!(resolved, PathBuf::from("/home/user/repos/ipcc"));
    }

    #[test]
    fn resolve_tilde_without_home_fails() {
        let system = MockSystem::new();
        assert!(resolve_user_path(&system, "~/repos").is_err());
    }
}
