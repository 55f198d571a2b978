//! Warden Application - Session lifecycle and use cases
//!
//! This crate wires the pure domain rules to the outside world through
//! ports: storage areas, the router, the clock and the HTTP transport.

pub mod auth;
pub mod error;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs
)]
mod testing;

pub use auth::{
    AuthSessionManager, CredentialStore, InterceptOutcome, InterceptedTransport, SessionGuard,
    SessionSignal, StoredCredentials, TransportInterceptor,
};
pub use error::{ApplicationError, ApplicationResult};
pub use ports::{Clock, HttpTransport, Navigator, StorageArea, StorageError, TransportError};
pub use use_cases::{
    FederatedSignIn, LoginError, PasswordCredentials, PasswordSignIn, RegisterAccount,
    RegistrationRequest, SignInOutcome,
};
