//! File-backed storage area.
//!
//! Backs the persistent ("remember me") backend. The whole area is one JSON
//! object kept in memory and written through on every change:
//! - Linux: ~/.local/share/warden/persistent-storage.json
//! - macOS: ~/Library/Application Support/warden/persistent-storage.json
//! - Windows: %APPDATA%/warden/persistent-storage.json

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, warn};
use warden_application::ports::{StorageArea, StorageError};

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// File name of the persistent area.
pub const STORAGE_FILE_NAME: &str = "persistent-storage.json";

/// Key/value area persisted to a JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Returns the default storage path in the platform data directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("warden").join(STORAGE_FILE_NAME))
    }

    /// Opens the area at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no data directory or the file cannot
    /// be read.
    pub fn open_default() -> Result<Self, StorageError> {
        let path = Self::default_path()
            .ok_or_else(|| StorageError::Unavailable("no data directory".to_string()))?;
        Self::open(path)
    }

    /// Opens the area at `path`. A missing file is an empty area; an
    /// unreadable JSON document is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => from_json_bytes(&bytes).unwrap_or_else(|error| {
                warn!(path = %path.display(), %error, "discarding unreadable storage file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };
        debug!(path = %path.display(), keys = entries.len(), "storage file opened");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let bytes =
            to_json_stable_bytes(entries).map_err(|e| StorageError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        fs::write(&self.path, bytes).map_err(|e| StorageError::Io(e.to_string()))
    }
}

impl StorageArea for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(error) = self.flush(&entries) {
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(error);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(error) = self.flush(&entries) {
            // Memory keeps mirroring the file that still holds the key.
            entries.insert(key.to_string(), previous);
            return Err(error);
        }
        Ok(())
    }
}
