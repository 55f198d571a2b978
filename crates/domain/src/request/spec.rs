//! Outbound API request.

use serde::{Deserialize, Serialize};

use super::{Headers, HttpMethod, RequestBody};
use crate::error::{DomainError, DomainResult};

/// A request against the backend, addressed by path.
///
/// The path is resolved against the configured base URL by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path (and optional query) relative to the API base URL.
    pub path: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Bearer token to send instead of the stored one.
    ///
    /// Used while a sign-in is still assembling its session and nothing
    /// has been persisted yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_override: Option<String>,
}

impl ApiRequest {
    /// Creates a request with no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: RequestBody::None,
            bearer_override: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request with a JSON body.
    #[must_use]
    pub fn post_json(path: impl Into<String>, json: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path).with_body(RequestBody::Json(json.into()))
    }

    /// Creates a POST request with a form-encoded body.
    #[must_use]
    pub fn post_form(path: impl Into<String>, form: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path).with_body(RequestBody::Form(form.into()))
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Pins the bearer token for this request.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_override = Some(token.into());
        self
    }

    /// Checks that the path is non-empty and rooted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPath` otherwise.
    pub fn validate(&self) -> DomainResult<()> {
        if self.path.starts_with('/') {
            Ok(())
        } else {
            Err(DomainError::InvalidPath(self.path.clone()))
        }
    }
}
