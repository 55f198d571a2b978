//! Session lifecycle for the Warden session core.
//!
//! This module provides:
//! - Dual-backend credential persistence
//! - Bearer attachment and credential-rejection handling on the transport
//! - The session state holder and its login/logout/restore transitions
//! - Route guards bound to the published session state

mod credential_store;
mod guard;
mod interceptor;
mod session_manager;

pub use credential_store::{CredentialStore, StoredCredentials};
pub use guard::SessionGuard;
pub use interceptor::{InterceptOutcome, InterceptedTransport, SessionSignal, TransportInterceptor};
pub use session_manager::AuthSessionManager;
