//! Auth settings persistence.
//!
//! Stores auth settings in the platform-specific config directory:
//! - Linux/macOS: ~/.config/warden/auth.json
//! - Windows: %APPDATA%/warden/auth.json

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};
use warden_domain::AuthSettings;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Environment variable overriding the API base URL.
pub const API_BASE_URL_ENV: &str = "WARDEN_API_BASE_URL";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for auth settings persistence.
#[derive(Debug, Clone, Default)]
pub struct AuthSettingsRepository {
    path: Option<PathBuf>,
}

impl AuthSettingsRepository {
    /// Creates a repository using the default config location.
    #[must_use]
    pub const fn new() -> Self {
        Self { path: None }
    }

    /// Creates a repository reading and writing `path`.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the path to the Warden config directory.
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("warden"))
    }

    /// Returns the path settings are read from.
    #[must_use]
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| Self::config_dir().map(|p| p.join("auth.json")))
    }

    /// Loads settings from disk.
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<AuthSettings, SettingsError> {
        let Some(path) = self.settings_path() else {
            return Ok(AuthSettings::default());
        };

        if !fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "no settings file; using defaults");
            return Ok(AuthSettings::default());
        }

        let content = fs::read(&path).await?;
        let settings = from_json_bytes(&content)?;
        Ok(settings)
    }

    /// Loads settings and applies `WARDEN_API_BASE_URL` if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed.
    pub async fn load_with_env(&self) -> Result<AuthSettings, SettingsError> {
        let settings = self.load().await?;
        Ok(apply_env_override(
            settings,
            std::env::var(API_BASE_URL_ENV).ok(),
        ))
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no config directory or the file
    /// cannot be written.
    pub async fn save(&self, settings: &AuthSettings) -> Result<(), SettingsError> {
        let Some(path) = self.settings_path() else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = to_json_stable_bytes(settings)?;
        fs::write(&path, content).await?;

        Ok(())
    }
}

/// Replaces the API base URL with a non-blank override.
#[must_use]
pub fn apply_env_override(mut settings: AuthSettings, base_url: Option<String>) -> AuthSettings {
    if let Some(base_url) = base_url.filter(|value| !value.trim().is_empty()) {
        info!(%base_url, "API base URL overridden from environment");
        settings.api_base_url = base_url.trim().to_string();
    }
    settings
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn settings_path_is_valid() {
        if let Some(p) = AuthSettingsRepository::new().settings_path() {
            assert!(p.ends_with("warden/auth.json"));
        }
    }

    #[tokio::test]
    async fn load_returns_default_when_no_file() {
        let dir = TempDir::new().unwrap();
        let repo = AuthSettingsRepository::at(dir.path().join("auth.json"));
        assert_eq!(repo.load().await.unwrap(), AuthSettings::default());
    }

    #[tokio::test]
    async fn load_with_env_layers_the_override_on_the_file() {
        let dir = TempDir::new().unwrap();
        let repo = AuthSettingsRepository::at(dir.path().join("auth.json"));
        let on_disk = AuthSettings {
            api_base_url: "https://library.example".to_string(),
            ..AuthSettings::default()
        };
        repo.save(&on_disk).await.unwrap();

        let expected = apply_env_override(on_disk, std::env::var(API_BASE_URL_ENV).ok());
        assert_eq!(repo.load_with_env().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let repo = AuthSettingsRepository::at(dir.path().join("config").join("auth.json"));
        let settings = AuthSettings {
            login_path: "/signin".to_string(),
            ..AuthSettings::default()
        };

        repo.save(&settings).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let result = AuthSettingsRepository::at(path).load().await;
        assert!(matches!(result, Err(SettingsError::Serialization(_))));
    }

    #[test]
    fn env_override_ignores_blank_values() {
        let base = AuthSettings::default();
        assert_eq!(apply_env_override(base.clone(), None), base);
        assert_eq!(apply_env_override(base.clone(), Some("  ".to_string())), base);
        assert_eq!(
            apply_env_override(base, Some(" https://library.example ".to_string())).api_base_url,
            "https://library.example"
        );
    }
}
