//! Request/response interception.
//!
//! The interceptor attaches the stored bearer token to outbound requests
//! and turns a rejected credential into a [`SessionSignal`]. It never
//! navigates itself; the session manager owns that decision.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use warden_domain::auth::{bearer_header, token_preview};
use warden_domain::request::AUTHORIZATION;
use warden_domain::{ApiRequest, ApiResponse, AuthSettings};

use super::credential_store::CredentialStore;
use crate::ports::{HttpTransport, TransportError};

/// Events the transport layer raises for the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// A non-login request came back unauthorized.
    CredentialRejected {
        /// Path of the rejected request.
        url: String,
    },
}

/// What the inbound hook did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptOutcome {
    /// Nothing to react to.
    PassThrough,
    /// A login exchange was rejected; left for the caller to report.
    LoginRejected,
    /// Storage was cleared and a rejection signal was raised.
    CredentialRejected,
}

/// Bearer attachment and rejection handling around every request.
#[derive(Debug, Clone)]
pub struct TransportInterceptor {
    store: CredentialStore,
    settings: Arc<AuthSettings>,
    signals: mpsc::UnboundedSender<SessionSignal>,
}

impl TransportInterceptor {
    /// Creates an interceptor raising signals on `signals`.
    #[must_use]
    pub const fn new(
        store: CredentialStore,
        settings: Arc<AuthSettings>,
        signals: mpsc::UnboundedSender<SessionSignal>,
    ) -> Self {
        Self {
            store,
            settings,
            signals,
        }
    }

    /// Outbound hook: sets or strips the `Authorization` header.
    pub fn on_request(&self, request: &mut ApiRequest) {
        let token = request
            .bearer_override
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| self.store.read_token());

        match token {
            Some(token) => {
                debug!(path = %request.path, token = %token_preview(&token), "attaching bearer");
                request.headers.set(AUTHORIZATION, bearer_header(&token));
            }
            None => request.headers.remove(AUTHORIZATION),
        }
    }

    /// Inbound hook: reacts to an unauthorized response.
    ///
    /// Rejections of credential-acquisition endpoints are left alone so a
    /// failed login never logs anybody out.
    pub fn on_response(&self, request: &ApiRequest, response: &ApiResponse) -> InterceptOutcome {
        if !response.is_unauthorized() {
            return InterceptOutcome::PassThrough;
        }

        if self.settings.is_credential_endpoint(&request.path) {
            debug!(path = %request.path, "login exchange rejected");
            return InterceptOutcome::LoginRejected;
        }

        warn!(path = %request.path, status = response.status, "credential rejected by backend");
        self.store.clear();

        let signal = SessionSignal::CredentialRejected {
            url: request.path.clone(),
        };
        if self.signals.send(signal).is_err() {
            debug!("no session manager listening for rejection signals");
        }

        InterceptOutcome::CredentialRejected
    }

    /// Wraps a transport so every request goes through this interceptor.
    #[must_use]
    pub fn wrap<T: HttpTransport>(self, inner: T) -> InterceptedTransport<T> {
        InterceptedTransport {
            inner,
            interceptor: self,
        }
    }
}

/// Transport decorator applying a [`TransportInterceptor`].
///
/// Responses come back exactly as the inner transport returned them.
#[derive(Debug, Clone)]
pub struct InterceptedTransport<T> {
    inner: T,
    interceptor: TransportInterceptor,
}

impl<T> InterceptedTransport<T> {
    /// The interceptor in use.
    #[must_use]
    pub const fn interceptor(&self) -> &TransportInterceptor {
        &self.interceptor
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for InterceptedTransport<T> {
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.interceptor.on_request(&mut request);
        let probe = ApiRequest::new(request.method, request.path.clone());
        let response = self.inner.send(request).await?;
        self.interceptor.on_response(&probe, &response);
        Ok(response)
    }
}
