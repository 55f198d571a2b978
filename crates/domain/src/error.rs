//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A request path is empty or not rooted.
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// A storage backend name could not be recognized.
    #[error("unknown storage backend: {0}")]
    UnknownBackend(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
