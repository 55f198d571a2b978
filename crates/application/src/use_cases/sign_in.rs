//! Sign-in use cases
//!
//! Both flows exchange credentials for a bearer token, make sure a user
//! profile is at hand, then hand the pair to [`AuthSessionManager`]. Any
//! failure after the exchange starts rolls the session back.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use warden_domain::{
    ApiRequest, ApiResponse, LoginPayload, SessionSnapshot, StorageBackend, UserProfile,
};

use crate::auth::AuthSessionManager;
use crate::ports::{HttpTransport, TransportError};

/// Message shown when the backend gives no usable reason.
pub const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please try again.";

/// Errors surfaced to the login surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// Username/password or id token missing.
    #[error("missing credentials")]
    MissingCredentials,

    /// The backend refused the exchange.
    #[error("login rejected ({status}): {message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Message extracted from the failure payload.
        message: String,
    },

    /// The backend answered without a token or user.
    #[error("invalid login payload: {0}")]
    InvalidPayload(String),

    /// No response was received.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The request body could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl LoginError {
    /// Human-readable message for the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredentials => "Please enter your username and password.".to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::InvalidPayload(_) | Self::Encoding(_) => GENERIC_LOGIN_FAILURE.to_string(),
            Self::Transport(error) => format!("Could not reach the server: {error}"),
        }
    }
}

/// Username/password form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    /// Username as typed.
    pub username: String,
    /// Password as typed.
    pub password: String,
    /// Keep the session across browser restarts.
    pub remember_me: bool,
}

impl PasswordCredentials {
    /// Credentials with "remember me" set.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember_me: true,
        }
    }

    /// Sets the "remember me" choice.
    #[must_use]
    pub const fn remember_me(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }
}

#[derive(Serialize)]
struct PasswordForm<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct FederatedBody<'a> {
    token: &'a str,
}

/// A completed sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignInOutcome {
    /// Snapshot published by the session manager.
    pub session: Arc<SessionSnapshot>,
    /// Where to navigate next.
    pub redirect_to: String,
}

fn rejected(response: &ApiResponse) -> LoginError {
    LoginError::Rejected {
        status: response.status,
        message: response
            .error_message()
            .unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string()),
    }
}

fn redirect_target(manager: &AuthSessionManager, return_to: Option<&str>) -> String {
    return_to
        .filter(|path| !path.is_empty() && !manager.settings().is_login_path(path))
        .map_or_else(|| manager.settings().post_login_path.clone(), ToString::to_string)
}

fn establish(
    manager: &AuthSessionManager,
    payload: &LoginPayload,
    backend: StorageBackend,
    return_to: Option<&str>,
) -> Result<SignInOutcome, LoginError> {
    let session = manager
        .login_with_backend(payload, backend)
        .ok_or_else(|| LoginError::InvalidPayload("token or user missing".to_string()))?;
    Ok(SignInOutcome {
        session,
        redirect_to: redirect_target(manager, return_to),
    })
}

/// Password sign-in against the token endpoint.
pub struct PasswordSignIn<T> {
    transport: T,
    manager: Arc<AuthSessionManager>,
}

impl<T: HttpTransport> PasswordSignIn<T> {
    /// Creates a new `PasswordSignIn` use case.
    pub const fn new(transport: T, manager: Arc<AuthSessionManager>) -> Self {
        Self { transport, manager }
    }

    /// Executes the use case.
    ///
    /// # Arguments
    /// * `credentials` - Form input
    /// * `return_to` - Destination captured by the route guard, if any
    ///
    /// # Errors
    /// Returns an error if the credentials are blank, the backend rejects
    /// them, or the response lacks a token or user.
    pub async fn execute(
        &self,
        credentials: &PasswordCredentials,
        return_to: Option<&str>,
    ) -> Result<SignInOutcome, LoginError> {
        let username = credentials.username.trim();
        let password = credentials.password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let result = self
            .exchange(username, password, credentials.remember_me, return_to)
            .await;
        match &result {
            Ok(outcome) => info!(redirect_to = %outcome.redirect_to, "password sign-in succeeded"),
            Err(error) => {
                warn!(%error, "password sign-in failed");
                self.manager.logout();
            }
        }
        result
    }

    async fn exchange(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
        return_to: Option<&str>,
    ) -> Result<SignInOutcome, LoginError> {
        let settings = self.manager.settings();
        let form = serde_urlencoded::to_string(PasswordForm { username, password })
            .map_err(|e| LoginError::Encoding(e.to_string()))?;

        let response = self
            .transport
            .send(ApiRequest::post_form(settings.token_endpoint.clone(), form))
            .await?;
        if !response.is_success() {
            return Err(rejected(&response));
        }

        let mut payload: LoginPayload = response
            .json()
            .map_err(|e| LoginError::InvalidPayload(e.to_string()))?;
        let token = payload
            .token()
            .ok_or_else(|| LoginError::InvalidPayload("access_token missing".to_string()))?
            .to_string();

        if payload.profile().is_none() {
            payload.user = Some(self.fetch_profile(&token).await?);
        }

        establish(
            &self.manager,
            &payload,
            StorageBackend::for_remember_me(remember_me),
            return_to,
        )
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, LoginError> {
        let request =
            ApiRequest::get(self.manager.settings().profile_endpoint.clone()).with_bearer(token);
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(rejected(&response));
        }
        response
            .json()
            .map_err(|e| LoginError::InvalidPayload(format!("profile: {e}")))
    }
}

/// Federated (Google) sign-in.
pub struct FederatedSignIn<T> {
    transport: T,
    manager: Arc<AuthSessionManager>,
}

impl<T: HttpTransport> FederatedSignIn<T> {
    /// Creates a new `FederatedSignIn` use case.
    pub const fn new(transport: T, manager: Arc<AuthSessionManager>) -> Self {
        Self { transport, manager }
    }

    /// Exchanges an identity-provider token for a session.
    ///
    /// # Errors
    /// Returns an error if the id token is blank, the backend rejects it,
    /// or the response lacks a token or user.
    pub async fn execute(
        &self,
        id_token: &str,
        return_to: Option<&str>,
    ) -> Result<SignInOutcome, LoginError> {
        if id_token.trim().is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let result = self.exchange(id_token, return_to).await;
        match &result {
            Ok(_) => info!("federated sign-in succeeded"),
            Err(error) => {
                warn!(%error, "federated sign-in failed");
                self.manager.logout();
            }
        }
        result
    }

    async fn exchange(
        &self,
        id_token: &str,
        return_to: Option<&str>,
    ) -> Result<SignInOutcome, LoginError> {
        let body = serde_json::to_string(&FederatedBody { token: id_token })
            .map_err(|e| LoginError::Encoding(e.to_string()))?;
        let response = self
            .transport
            .send(ApiRequest::post_json(
                self.manager.settings().federated_endpoint.clone(),
                body,
            ))
            .await?;
        if !response.is_success() {
            return Err(rejected(&response));
        }

        let payload: LoginPayload = response
            .json()
            .map_err(|e| LoginError::InvalidPayload(e.to_string()))?;
        establish(&self.manager, &payload, StorageBackend::Persistent, return_to)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use crate::testing::{ManualClock, MapArea, RecordingRouter, ScriptedTransport};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use warden_domain::request::AUTHORIZATION;
    use warden_domain::{AuthSettings, HttpMethod, RequestBody};

    struct Fixture {
        manager: Arc<AuthSessionManager>,
        persistent: Arc<MapArea>,
        ephemeral: Arc<MapArea>,
    }

    fn fixture() -> Fixture {
        let settings = Arc::new(AuthSettings::default());
        let persistent = Arc::new(MapArea::default());
        let ephemeral = Arc::new(MapArea::default());
        let store = CredentialStore::new(persistent.clone(), ephemeral.clone(), &settings);
        let manager = AuthSessionManager::new(
            store,
            Arc::new(ManualClock::at(Utc::now())),
            Arc::new(RecordingRouter::at("/login")),
            settings,
        );
        Fixture {
            manager: Arc::new(manager),
            persistent,
            ephemeral,
        }
    }

    const USER: &str = r#"{"id":9,"username":"ada","role":{"name":"Librarian"},"permissions":["BOOK_EDIT"]}"#;

    #[tokio::test]
    async fn blank_credentials_never_hit_the_network() {
        let fx = fixture();
        let transport = ScriptedTransport::new(|_| panic!("no request expected"));
        let use_case = PasswordSignIn::new(transport.clone(), fx.manager);

        let err = use_case
            .execute(&PasswordCredentials::new("  ", "secret"), None)
            .await
            .unwrap_err();

        assert_eq!(err, LoginError::MissingCredentials);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn embedded_user_skips_profile_fetch() {
        let fx = fixture();
        let transport = ScriptedTransport::new(|_| {
            Ok(ApiResponse::new(
                200,
                format!(r#"{{"access_token":"abc","token_type":"bearer","user":{USER}}}"#),
            ))
        });
        let use_case = PasswordSignIn::new(transport.clone(), Arc::clone(&fx.manager));

        let outcome = use_case
            .execute(&PasswordCredentials::new(" ada ", "pw"), Some("/admin/books"))
            .await
            .unwrap();

        assert_eq!(outcome.redirect_to, "/admin/books");
        assert_eq!(outcome.session.role.as_deref(), Some("librarian"));
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].path, "/api/token");
        assert_eq!(
            sent[0].body,
            RequestBody::Form("username=ada&password=pw".to_string())
        );
        assert_eq!(fx.persistent.raw("access_token").as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn missing_user_is_fetched_with_fresh_token() {
        let fx = fixture();
        let transport = ScriptedTransport::new(|request| {
            if request.path == "/api/token" {
                Ok(ApiResponse::new(200, r#"{"access_token":"fresh"}"#))
            } else {
                Ok(ApiResponse::new(200, USER))
            }
        });
        let use_case = PasswordSignIn::new(transport.clone(), Arc::clone(&fx.manager));

        let outcome = use_case
            .execute(&PasswordCredentials::new("ada", "pw").remember_me(false), None)
            .await
            .unwrap();

        assert_eq!(outcome.redirect_to, "/admin/dashboard");
        let sent = transport.sent();
        assert_eq!(sent[1].path, "/api/profile/");
        assert_eq!(sent[1].bearer_override.as_deref(), Some("fresh"));
        assert!(!sent[1].headers.contains(AUTHORIZATION));
        assert!(fx.persistent.is_empty());
        assert_eq!(fx.ephemeral.raw("access_token").as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn rejection_surfaces_detail_and_rolls_back() {
        let fx = fixture();
        fx.manager
            .login(&LoginPayload::new("old", UserProfile::new(1)));
        let transport = ScriptedTransport::new(|_| {
            Ok(ApiResponse::new(
                401,
                r#"{"detail":"Incorrect username or password"}"#,
            ))
        });
        let use_case = PasswordSignIn::new(transport, Arc::clone(&fx.manager));

        let err = use_case
            .execute(&PasswordCredentials::new("ada", "bad"), None)
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Incorrect username or password");
        assert!(!fx.manager.snapshot().is_authenticated());
        assert!(fx.persistent.is_empty());
    }

    #[tokio::test]
    async fn token_without_access_token_is_invalid() {
        let fx = fixture();
        let transport =
            ScriptedTransport::new(|_| Ok(ApiResponse::new(200, r#"{"token_type":"bearer"}"#)));
        let use_case = PasswordSignIn::new(transport, fx.manager);

        let err = use_case
            .execute(&PasswordCredentials::new("ada", "pw"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::InvalidPayload(_)));
        assert_eq!(err.user_message(), GENERIC_LOGIN_FAILURE);
    }

    #[tokio::test]
    async fn federated_requires_embedded_user() {
        let fx = fixture();
        let transport = ScriptedTransport::new(|request| {
            assert_eq!(request.body, RequestBody::Json(r#"{"token":"google-id"}"#.to_string()));
            Ok(ApiResponse::new(200, r#"{"access_token":"abc"}"#))
        });
        let use_case = FederatedSignIn::new(transport, Arc::clone(&fx.manager));

        let err = use_case.execute("google-id", None).await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidPayload(_)));
        assert!(fx.persistent.is_empty());
    }

    #[tokio::test]
    async fn federated_signs_in() {
        let fx = fixture();
        let transport = ScriptedTransport::new(|_| {
            Ok(ApiResponse::new(
                200,
                format!(r#"{{"access_token":"abc","user":{USER}}}"#),
            ))
        });
        let use_case = FederatedSignIn::new(transport, Arc::clone(&fx.manager));

        let outcome = use_case.execute("google-id", Some("/login")).await.unwrap();
        assert_eq!(outcome.redirect_to, "/admin/dashboard");
        assert!(fx.manager.has_permission("BOOK_EDIT"));
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let fx = fixture();
        let transport = ScriptedTransport::new(|_| {
            Err(TransportError::ConnectionFailed("refused".to_string()))
        });
        let use_case = FederatedSignIn::new(transport, fx.manager);

        let err = use_case.execute("google-id", None).await.unwrap_err();
        assert_eq!(
            err,
            LoginError::Transport(TransportError::ConnectionFailed("refused".to_string()))
        );
    }
}
