//! Public registration use case

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use warden_domain::{ApiRequest, AuthSettings};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::HttpTransport;

/// Registration form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Desired username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Submits a registration. Has no effect on the current session.
pub struct RegisterAccount<T> {
    transport: T,
    endpoint: String,
}

impl<T: HttpTransport> RegisterAccount<T> {
    /// Creates a new `RegisterAccount` use case.
    pub fn new(transport: T, settings: &AuthSettings) -> Self {
        Self {
            transport,
            endpoint: settings.register_endpoint.clone(),
        }
    }

    /// Executes the use case, returning the server's JSON answer.
    ///
    /// # Errors
    /// Returns an error if the request fails, the server refuses it, or
    /// the answer is not JSON.
    pub async fn execute(&self, request: &RegistrationRequest) -> ApplicationResult<Value> {
        let body = serde_json::to_string(request)
            .map_err(|e| ApplicationError::InvalidResponse(e.to_string()))?;
        let response = self
            .transport
            .send(ApiRequest::post_json(self.endpoint.clone(), body))
            .await?;

        if !response.is_success() {
            return Err(ApplicationError::Rejected {
                status: response.status,
                message: response
                    .error_message()
                    .unwrap_or_else(|| "Registration failed".to_string()),
            });
        }

        info!(username = %request.username, "registration submitted");
        response
            .json()
            .map_err(|e| ApplicationError::InvalidResponse(e.to_string()))
    }
}
