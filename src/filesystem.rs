//! File storage used for fragments and manifests
//!
//! Everything the engine reads or writes goes through the [`FileStore`] trait:
//! [`DiskStore`] is the real implementation rooted at a working directory and
//! [`MemoryStore`] keeps files in memory for tests and dry experiments.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Text file primitives needed by the engine
pub trait FileStore {
    /// Read a file, `None` when it does not exist
    fn read(&self, path: &Path) -> Result<Option<String>>;

    /// Create or overwrite a file
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Delete a file, returns `false` if there was nothing to delete
    fn delete(&self, path: &Path) -> Result<bool>;

    /// Copy `from` to `to`, overwriting `to`
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
}

/// Host filesystem store; relative paths resolve against `root`
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileStore for DiskStore {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(self.resolve(path)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(target, content)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn delete(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(self.resolve(path)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let target = self.resolve(to);
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::copy(self.resolve(from), target)?;
        Ok(())
    }
}

/// In-memory store, files keyed by path
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, String>>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to seed a file
    pub fn with_file<P: AsRef<Path>>(self, path: P, content: &str) -> Self {
        self.files
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), content.to_string());
        self
    }

    /// Content of a file, if present
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Number of `write`/`copy` calls performed so far
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    /// List all stored paths
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        *self.writes.borrow_mut() += 1;
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn delete(&self, path: &Path) -> Result<bool> {
        Ok(self.files.borrow_mut().remove(path).is_some())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let content = self.get(from).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("File not found: {}", from.display()),
            ))
        })?;
        self.write(to, &content)
    }
}
