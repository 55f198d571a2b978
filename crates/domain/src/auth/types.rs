//! Session domain types

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::claims::{DecodeError, SessionDecoder};
use super::profile::UserProfile;
use super::role::is_admin_role;
use crate::error::DomainError;

/// Bearer credential with its decoded expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The raw bearer token.
    pub token: String,
    /// When the token expires, if it carries an `exp` claim.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Creates a credential from already-known parts.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Builds a credential by decoding the token's expiry claim.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the token is malformed.
    pub fn decode(token: impl Into<String>) -> Result<Self, DecodeError> {
        let token = token.into();
        let expires_at = SessionDecoder::decode_expiry(&token)?;
        Ok(Self { token, expires_at })
    }

    /// A credential is valid only while its expiry lies strictly in the future.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Short, log-safe token preview.
    #[must_use]
    pub fn preview(&self) -> String {
        token_preview(&self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.preview())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Formats a bearer `Authorization` header value.
#[must_use]
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Log-safe token preview: the first 8 chars of long tokens, a mask otherwise.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() <= 12 {
        return "***".to_string();
    }
    let cut = token
        .char_indices()
        .nth(8)
        .map_or(token.len(), |(index, _)| index);
    format!("{}...", &token[..cut])
}

/// Browser-style storage area a session is persisted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Survives browser restarts ("remember me").
    #[default]
    Persistent,
    /// Survives only the current tab/session.
    Ephemeral,
}

impl StorageBackend {
    /// Backends in read-preference order.
    pub const READ_ORDER: [Self; 2] = [Self::Persistent, Self::Ephemeral];

    /// The mutually exclusive counterpart.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Persistent => Self::Ephemeral,
            Self::Ephemeral => Self::Persistent,
        }
    }

    /// Picks the backend for a "remember me" choice.
    #[must_use]
    pub const fn for_remember_me(remember_me: bool) -> Self {
        if remember_me {
            Self::Persistent
        } else {
            Self::Ephemeral
        }
    }

    /// Returns the backend as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::Ephemeral => "ephemeral",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "persistent" | "local" => Ok(Self::Persistent),
            "ephemeral" | "session" => Ok(Self::Ephemeral),
            other => Err(DomainError::UnknownBackend(other.to_string())),
        }
    }
}

/// An authenticated session held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The bearer credential.
    pub credential: Credential,
    /// The authenticated user.
    pub user: UserProfile,
    /// Where the session is persisted.
    pub backend: StorageBackend,
}

impl Session {
    /// Creates a session.
    #[must_use]
    pub const fn new(credential: Credential, user: UserProfile, backend: StorageBackend) -> Self {
        Self {
            credential,
            user,
            backend,
        }
    }

    /// Canonical lower-cased role.
    #[must_use]
    pub fn role(&self) -> Option<String> {
        self.user.normalized_role()
    }

    /// Permission codes granted to the user.
    #[must_use]
    pub const fn permissions(&self) -> &BTreeSet<String> {
        &self.user.permissions
    }

    /// Whether the user gets the admin bypass.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|role| is_admin_role(&role))
    }
}

/// Body of a credential-acquisition response.
///
/// Both fields are optional on the wire; callers decide what a missing
/// field means.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoginPayload {
    /// Issued bearer token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token type, normally `bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Embedded user profile.
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl LoginPayload {
    /// Creates a complete payload.
    #[must_use]
    pub fn new(access_token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            access_token: Some(access_token.into()),
            token_type: None,
            user: Some(user),
        }
    }

    /// Returns the token if present and non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|token| !token.is_empty())
    }

    /// Returns the user if present and non-empty.
    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        self.user.as_ref().filter(|user| !user.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn preview_never_reveals_a_whole_token() {
        assert_eq!(token_preview("abc"), "***");
        assert_eq!(token_preview("twelve-chars"), "***");
        assert_eq!(token_preview("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGci...");
        assert_eq!(format!("{:?}", Credential::new("abc", None)), r#"Credential { token: "***", expires_at: None }"#);
    }

    #[test]
    fn credential_validity_is_strict() {
        let now = Utc::now();
        let credential = Credential::new("t", Some(now));
        assert!(!credential.is_valid_at(now));
        assert!(credential.is_valid_at(now - Duration::seconds(1)));
        assert!(!credential.is_valid_at(now + Duration::seconds(1)));
    }

    #[test]
    fn non_expiring_credential_is_always_valid() {
        let credential = Credential::new("t", None);
        assert!(credential.is_valid_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn debug_hides_token() {
        let credential = Credential::new("abcdefghijklmnopqrstuvwxyz", None);
        let debug = format!("{credential:?}");
        assert!(debug.contains("abcdefgh..."));
        assert!(!debug.contains("xyz"));
    }

    #[test]
    fn backend_counterpart_and_parsing() {
        assert_eq!(StorageBackend::Persistent.other(), StorageBackend::Ephemeral);
        assert_eq!(StorageBackend::Ephemeral.other(), StorageBackend::Persistent);
        assert_eq!(
            "session".parse::<StorageBackend>().unwrap(),
            StorageBackend::Ephemeral
        );
        assert_eq!(
            StorageBackend::for_remember_me(true),
            StorageBackend::Persistent
        );
        assert!("cookie".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn session_role_and_admin_flag() {
        let session = Session::new(
            Credential::new("t", None),
            UserProfile::new(1).with_role("SuperAdmin"),
            StorageBackend::Persistent,
        );
        assert_eq!(session.role().as_deref(), Some("superadmin"));
        assert!(session.is_admin());
    }

    #[test]
    fn login_payload_filters_empty_parts() {
        let payload: LoginPayload =
            serde_json::from_str(r#"{"access_token":"","user":{}}"#).unwrap();
        assert_eq!(payload.token(), None);
        assert_eq!(payload.profile(), None);

        let payload: LoginPayload = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"bearer","user":{"id":1}}"#,
        )
        .unwrap();
        assert_eq!(payload.token(), Some("abc"));
        assert_eq!(payload.profile().and_then(|u| u.id), Some(1));
    }
}
