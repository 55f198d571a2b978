//! Storage area port
//!
//! One [`StorageArea`] models one browser-style key/value storage
//! (persistent or per-session). Reads and writes are synchronous.

/// Errors raised by a storage area.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The area refused the write because it is full.
    #[error("storage quota exceeded while writing '{key}'")]
    QuotaExceeded {
        /// Key being written.
        key: String,
    },

    /// The area cannot be used at all (disabled, locked, missing).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The area's backing data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

/// A string key/value storage area.
pub trait StorageArea: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the area cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the area rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the area cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
