//! In-memory storage area.
//!
//! Backs the ephemeral ("this session only") backend: contents vanish with
//! the process. An optional byte quota mimics browser storage limits.

use std::collections::HashMap;

use parking_lot::RwLock;
use warden_application::ports::{StorageArea, StorageError};

/// Thread-safe in-memory key/value area.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Creates an unbounded area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an area that refuses writes past `quota_bytes` of keys and values.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StorageArea for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set("access_token", "abc").unwrap();
        assert_eq!(storage.get("access_token").unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.used_bytes(), "access_token".len() + 3);

        storage.remove("access_token").unwrap();
        storage.remove("access_token").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn quota_rejects_oversized_writes() {
        let storage = MemoryStorage::with_quota(20);
        storage.set("k", "short").unwrap();

        let err = storage.set("other", "x".repeat(32).as_str()).unwrap_err();
        assert_eq!(
            err,
            StorageError::QuotaExceeded {
                key: "other".to_string()
            }
        );
        assert_eq!(storage.len(), 1);

        // Overwriting an existing key only counts the new value.
        storage.set("k", "a-longer-value").unwrap();
    }
}
