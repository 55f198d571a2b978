//! HTTP request body types

use serde::{Deserialize, Serialize};

/// Request body, already encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// JSON text
    Json(String),
    /// `application/x-www-form-urlencoded` text
    Form(String),
}

impl RequestBody {
    /// Returns the content type if applicable.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some("application/json"),
            Self::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }

    /// Returns the encoded content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Json(content) | Self::Form(content) => Some(content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types() {
        assert_eq!(RequestBody::None.content_type(), None);
        assert_eq!(
            RequestBody::Json("{}".into()).content_type(),
            Some("application/json")
        );
        assert_eq!(
            RequestBody::Form("a=b".into()).content(),
            Some("a=b")
        );
    }
}
