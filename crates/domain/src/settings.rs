//! Auth settings domain model
//!
//! Every field has a default so a partial settings file is always valid.

use serde::{Deserialize, Serialize};

/// Default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Settings for the session core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Backend base URL requests are resolved against.
    pub api_base_url: String,
    /// Storage key holding the raw bearer token.
    pub token_key: String,
    /// Storage key holding the JSON user profile.
    pub user_key: String,
    /// Route of the login surface.
    pub login_path: String,
    /// Route authenticated-but-unauthorized users are sent to.
    pub landing_path: String,
    /// Route users land on after login when no destination was captured.
    pub post_login_path: String,
    /// Path fragments identifying credential-acquisition endpoints.
    pub credential_endpoints: Vec<String>,
    /// Password login endpoint.
    pub token_endpoint: String,
    /// Federated (Google) login endpoint.
    pub federated_endpoint: String,
    /// Profile fetch endpoint.
    pub profile_endpoint: String,
    /// Public registration endpoint.
    pub register_endpoint: String,
    /// Roles admitted to the admin panel.
    pub admin_panel_roles: Vec<String>,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_key: "access_token".to_string(),
            user_key: "user_details".to_string(),
            login_path: "/login".to_string(),
            landing_path: "/".to_string(),
            post_login_path: "/admin/dashboard".to_string(),
            credential_endpoints: vec!["/api/token".to_string(), "/api/auth/google".to_string()],
            token_endpoint: "/api/token".to_string(),
            federated_endpoint: "/api/auth/google".to_string(),
            profile_endpoint: "/api/profile/".to_string(),
            register_endpoint: "/api/public/register".to_string(),
            admin_panel_roles: ["admin", "superadmin", "editor", "manager", "librarian", "staff"]
                .into_iter()
                .map(String::from)
                .collect(),
            request_timeout_ms: 30_000,
        }
    }
}

impl AuthSettings {
    /// Returns true if `url` targets a credential-acquisition endpoint.
    #[must_use]
    pub fn is_credential_endpoint(&self, url: &str) -> bool {
        self.credential_endpoints
            .iter()
            .any(|fragment| !fragment.is_empty() && url.contains(fragment.as_str()))
    }

    /// Returns true if `path` is the login surface.
    #[must_use]
    pub fn is_login_path(&self, path: &str) -> bool {
        path == self.login_path
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: AuthSettings =
            serde_json::from_str(r#"{"api_base_url":"https://library.example"}"#).unwrap();
        assert_eq!(settings.api_base_url, "https://library.example");
        assert_eq!(settings.token_key, "access_token");
        assert_eq!(settings.user_key, "user_details");
        assert_eq!(settings.admin_panel_roles.len(), 6);
    }

    #[test]
    fn credential_endpoints_match_by_substring() {
        let settings = AuthSettings::default();
        assert!(settings.is_credential_endpoint("/api/token"));
        assert!(settings.is_credential_endpoint("http://127.0.0.1:8000/api/auth/google"));
        assert!(!settings.is_credential_endpoint("/api/profile/"));
        assert!(!settings.is_credential_endpoint("/api/books"));
    }
}
