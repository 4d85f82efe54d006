//! Object storage for fetched reports.
//!
//! Objects are written as raw bytes under a key, with no compression or
//! versioning. `LocalStore` maps a bucket to a directory; provider SDK
//! uploads plug in behind the same trait.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;

pub trait ObjectStore {
    /// Store `bytes` under `key`, replacing any previous object.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), AppError>;

    /// Fetch the object stored under `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>, AppError>;
}

/// A bucket backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && !key.contains(['/', '\\'])
            && key != "."
            && key != "..";
        if !valid {
            return Err(AppError::input(format!("Invalid object key '{key}'.")));
        }
        Ok(self.root.join(key))
    }
}

impl ObjectStore for LocalStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), AppError> {
        let path = self.object_path(key)?;
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::runtime(format!("Failed to create bucket '{}': {e}", self.root.display()))
        })?;

        // Write beside the target, then rename: readers never see a partial object.
        let tmp = self.root.join(format!(".{key}.partial"));
        fs::write(&tmp, bytes)
            .map_err(|e| AppError::runtime(format!("Failed to write '{}': {e}", tmp.display())))?;
        fs::rename(&tmp, &path).map_err(|e| {
            AppError::runtime(format!("Failed to move object into '{}': {e}", path.display()))
        })?;

        info!(bucket = %self.root.display(), key, bytes = bytes.len(), "object written");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.object_path(key)?;
        fs::read(&path)
            .map_err(|e| AppError::input(format!("Failed to read object '{}': {e}", path.display())))
    }
}
