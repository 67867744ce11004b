//! Mock system implementation for testing

use super::System;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// # Example
/// ```
/// use odb_config::system::{MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_file("/deploy/manifest.yml", b"name: my-deployment").unwrap();
///
/// assert!(system.exists(Path::new("/deploy/manifest.yml")));
/// assert!(!system.exists(Path::new("/deploy/other.yml")));
/// ```
#[derive(Clone, Default)]
pub struct MockSystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MockSystem {
    /// Create a new, empty `MockSystem`
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The in-memory file table is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let mut files = self
            .files
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        files.insert(path.as_ref().to_path_buf(), contents.to_vec());
        drop(files);
        Ok(self)
    }
}

impl System for MockSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let files = self
            .files
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let contents = files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })?;
        String::from_utf8(contents.clone())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .is_ok_and(|files| files.contains_key(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.exists(path)
    }
}
