//! Key-value persistence for the buffer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::fs::{read_optional, write_atomic};

/// Key the buffer is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "wysiwygContent";

/// Checks that `key` can name a single file: non-empty, no path separators,
/// and no leading dot (which also covers `.` and `..`).
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("key cannot be empty".to_string());
    }
    if key.contains(['/', '\\']) {
        return Err(format!("key '{key}' must not contain path separators"));
    }
    if key.starts_with('.') {
        return Err(format!("key '{key}' must not start with '.'"));
    }
    Ok(())
}

/// Persistent string storage keyed by name.
pub trait ContentStore {
    fn load(&self, key: &str) -> EditResult<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> EditResult<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl ContentStore for MemoryStore {
    fn load(&self, key: &str) -> EditResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> EditResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as a file named after the key inside `dir`.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> EditResult<PathBuf> {
        validate_key(key).map_err(|reason| {
            EditError::InvalidArguments(format!("invalid storage key: {reason}"))
        })?;
        Ok(self.dir.join(key))
    }
}

impl ContentStore for FileStore {
    fn load(&self, key: &str) -> EditResult<Option<String>> {
        read_optional(&self.entry_path(key)?)
    }

    fn save(&mut self, key: &str, value: &str) -> EditResult<()> {
        let path = self.entry_path(key)?;
        write_atomic(&path, value)?;
        debug!(path = %path.display(), bytes = value.len(), "persisted buffer");
        Ok(())
    }
}
