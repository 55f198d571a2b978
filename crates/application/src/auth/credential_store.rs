//! Dual-backend persistence of the bearer token and user profile.
//!
//! The token and the user live under two fixed keys in exactly one of the
//! two storage areas. Storage failures are logged and absorbed: callers
//! carry on in memory.

use std::sync::Arc;

use tracing::{debug, error, warn};
use warden_domain::{AuthSettings, StorageBackend, UserProfile};

use crate::ports::StorageArea;

/// Text some clients store when they serialize a missing user.
const ABSENT_PLACEHOLDERS: [&str; 2] = ["undefined", "null"];

/// What [`CredentialStore::read`] found.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredCredentials {
    /// Raw bearer token.
    pub token: Option<String>,
    /// Parsed user profile.
    pub user: Option<UserProfile>,
    /// Backend the token was read from.
    pub backend: Option<StorageBackend>,
}

/// Token and user persistence over a persistent and an ephemeral area.
#[derive(Clone)]
pub struct CredentialStore {
    persistent: Arc<dyn StorageArea>,
    ephemeral: Arc<dyn StorageArea>,
    token_key: String,
    user_key: String,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("token_key", &self.token_key)
            .field("user_key", &self.user_key)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates a store using the key names from settings.
    #[must_use]
    pub fn new(
        persistent: Arc<dyn StorageArea>,
        ephemeral: Arc<dyn StorageArea>,
        settings: &AuthSettings,
    ) -> Self {
        Self::with_keys(
            persistent,
            ephemeral,
            settings.token_key.clone(),
            settings.user_key.clone(),
        )
    }

    /// Creates a store with explicit key names.
    #[must_use]
    pub fn with_keys(
        persistent: Arc<dyn StorageArea>,
        ephemeral: Arc<dyn StorageArea>,
        token_key: impl Into<String>,
        user_key: impl Into<String>,
    ) -> Self {
        Self {
            persistent,
            ephemeral,
            token_key: token_key.into(),
            user_key: user_key.into(),
        }
    }

    fn area(&self, backend: StorageBackend) -> &dyn StorageArea {
        match backend {
            StorageBackend::Persistent => self.persistent.as_ref(),
            StorageBackend::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Persists the token and user into `backend` and removes both keys
    /// from the other backend.
    ///
    /// Does nothing when the token or the user is empty. Returns whether
    /// both values were persisted; on failure nothing is left half-written.
    pub fn write(&self, token: &str, user: &UserProfile, backend: StorageBackend) -> bool {
        if token.is_empty() || user.is_empty() {
            debug!(%backend, "skipping credential write: token or user missing");
            return false;
        }

        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "could not serialize user profile; keeping session in memory only");
                return false;
            }
        };

        self.remove_keys(backend.other());

        let target = self.area(backend);
        let written = target
            .set(&self.token_key, token)
            .and_then(|()| target.set(&self.user_key, &user_json));

        match written {
            Ok(()) => true,
            Err(error) => {
                warn!(%backend, %error, "credential write failed; keeping session in memory only");
                self.remove_keys(backend);
                false
            }
        }
    }

    /// Reads the token and user, preferring the persistent backend.
    ///
    /// Never fails: unreadable or unparsable entries read as absent.
    #[must_use]
    pub fn read(&self) -> StoredCredentials {
        let (token, backend) = match self.read_raw(&self.token_key) {
            Some((token, backend)) => (Some(token), Some(backend)),
            None => (None, None),
        };

        StoredCredentials {
            token,
            user: self.read_user(),
            backend,
        }
    }

    /// Reads just the token.
    #[must_use]
    pub fn read_token(&self) -> Option<String> {
        self.read_raw(&self.token_key).map(|(token, _)| token)
    }

    /// Reads just the user profile.
    #[must_use]
    pub fn read_user(&self) -> Option<UserProfile> {
        let (text, backend) = self.read_raw(&self.user_key)?;
        if ABSENT_PLACEHOLDERS.contains(&text.as_str()) {
            return None;
        }

        match serde_json::from_str::<UserProfile>(&text) {
            Ok(user) => Some(user),
            Err(error) => {
                error!(%backend, %error, key = %self.user_key, "stored user profile is not valid JSON");
                None
            }
        }
    }

    /// True when a token can be read from either backend.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_token().is_some()
    }

    /// Removes both keys from both backends.
    pub fn clear(&self) {
        for backend in StorageBackend::READ_ORDER {
            self.remove_keys(backend);
        }
    }

    fn read_raw(&self, key: &str) -> Option<(String, StorageBackend)> {
        StorageBackend::READ_ORDER.into_iter().find_map(|backend| {
            match self.area(backend).get(key) {
                Ok(Some(value)) if !value.is_empty() => Some((value, backend)),
                Ok(_) => None,
                Err(error) => {
                    warn!(%backend, %error, key, "storage read failed");
                    None
                }
            }
        })
    }

    fn remove_keys(&self, backend: StorageBackend) {
        let area = self.area(backend);
        for key in [&self.token_key, &self.user_key] {
            if let Err(error) = area.remove(key) {
                warn!(%backend, %error, key = %key, "storage remove failed");
            }
        }
    }
}
