//! Whole-document storage backends.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};

/// Load/save contract for the serialized knowledge document.
///
/// Implementations read and write the whole document at once; there are no
/// partial writes.
pub trait DocumentStorage: Send + Sync {
    /// Read the stored document, or `None` when nothing has been saved yet.
    fn load(&self) -> StoreResult<Option<String>>;

    /// Replace the stored document.
    fn save(&self, contents: &str) -> StoreResult<()>;
}

/// A JSON file on disk, replaced atomically through a sibling temp file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create a storage backend for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentStorage for JsonFileStorage {
    fn load(&self) -> StoreResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, contents: &str) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// In-process storage, useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-loaded with a document.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// The most recently saved document.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl DocumentStorage for MemoryStorage {
    fn load(&self) -> StoreResult<Option<String>> {
        let contents = self.contents.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(contents.clone())
    }

    fn save(&self, contents: &str) -> StoreResult<()> {
        let mut slot = self.contents.lock().map_err(|_| StoreError::Poisoned)?;
        *slot = Some(contents.to_string());
        Ok(())
    }
}
