//! Application error types

use thiserror::Error;

use crate::ports::TransportError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// No response was received.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The backend refused the request.
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Message extracted from the failure payload.
        message: String,
    },

    /// A payload could not be encoded or decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
