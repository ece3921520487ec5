//! Mock system implementation for testing

use super::System;
use std::collections::{HashMap, HashSet};
use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// `MockSystem` provides an in-memory filesystem and environment,
/// perfect for fast, isolated unit tests without side effects.
///
/// # Example
/// ```
/// use fetch_sparse::system::{MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_env("HOME", "/home/user")
///     .with_file("/test/fetch-sparse.yaml", b"fetches: []")
///     .with_dir("/test/dest");
///
/// assert_eq!(system.env_var("HOME").unwrap(), "/home/user");
/// assert!(system.exists(Path::new("/test/fetch-sparse.yaml")));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    env_vars: HashMap<String, String>,
    current_dir: PathBuf,
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                env_vars: HashMap::new(),
                current_dir: PathBuf::from("/"),
                files: HashMap::new(),
                dirs: HashSet::from([PathBuf::from("/")]),
            })),
        }
    }

    /// Set an environment variable (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_env(self, key: &str, value: &str) -> Self {
        {
            let mut state = self.state.write().expect("mock state poisoned");
            state.env_vars.insert(key.to_owned(), value.to_owned());
        }
        self
    }

    /// Set the current working directory (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_current_dir<P: AsRef<Path>>(self, dir: P) -> Self {
        {
            let mut state = self.state.write().expect("mock state poisoned");
            state.current_dir = dir.as_ref().to_path_buf();
        }
        self
    }

    /// Add a file with contents (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> Self {
        let path_buf = path.as_ref().to_path_buf();
        {
            let mut state = self.state.write().expect("mock state poisoned");
            if let Some(parent) = path_buf.parent() {
                Self::ensure_parent_dirs(&mut state.dirs, parent);
            }
            state.files.insert(path_buf, contents.to_vec());
        }
        self
    }

    /// Add a directory (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> Self {
        let path_buf = path.as_ref().to_path_buf();
        {
            let mut state = self.state.write().expect("mock state poisoned");
            Self::ensure_parent_dirs(&mut state.dirs, &path_buf);
            state.dirs.insert(path_buf);
        }
        self
    }

    #[inline]
    fn ensure_parent_dirs(dirs: &mut HashSet<PathBuf>, path: &Path) {
        let mut ancestors = Vec::new();
        let mut current = path;

        while let Some(parent) = current.parent() {
            ancestors.push(parent.to_path_buf());
            current = parent;
            if parent == Path::new("") || parent == Path::new("/") {
                break;
            }
        }

        for ancestor in ancestors {
            dirs.insert(ancestor);
        }
        dirs.insert(path.to_path_buf());
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        let state = self.state.read().map_err(|_poisoned| VarError::NotPresent)?;
        state.env_vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[inline]
    fn current_dir(&self) -> io::Result<PathBuf> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(state.current_dir.clone())
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let bytes = state.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })?;
        String::from_utf8(bytes.clone())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;

        if let Some(parent) = path.parent()
            && !state.dirs.contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }

        state.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        let Ok(state) = self.state.read() else {
            return false;
        };
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        let Ok(state) = self.state.read() else {
            return false;
        };
        state.files.contains_key(path)
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        let Ok(state) = self.state.read() else {
            return false;
        };
        state.dirs.contains(path)
    }
}
