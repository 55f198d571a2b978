//! API response type

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::Headers;

/// Status the backend uses to reject a credential.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// HTTP response as seen by the session core.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    #[serde(default)]
    pub headers: Headers,
    /// Response body as string
    #[serde(default)]
    pub body: String,
}

impl ApiResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true if the backend rejected the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Human-readable failure message carried by the body, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        extract_error_message(&self.body)
    }
}

/// Pulls a human-readable message out of an error payload.
///
/// Understands `{"detail": "..."}`, validation lists such as
/// `{"detail": [{"msg": "..."}]}`, and bare `[{"msg": "..."}]` arrays.
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = match &value {
        Value::Object(map) => map.get("detail")?,
        Value::Array(_) => &value,
        _ => return None,
    };

    match detail {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Array(items) => items
            .first()
            .and_then(|first| first.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
