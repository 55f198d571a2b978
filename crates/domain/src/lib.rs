//! Warden Domain - Core session and access-control types
//!
//! This crate defines the domain model for the Warden session core.
//! All types here are pure Rust with no I/O dependencies.

pub mod access;
pub mod auth;
pub mod error;
pub mod request;
pub mod response;
pub mod settings;
pub mod state;

pub use access::{AccessDecision, AccessPolicy, GuardState, RouteGuard, RouteRequirement};
pub use auth::{
    Credential, DecodeError, LoginPayload, RoleObject, RoleRef, Session, SessionDecoder,
    StorageBackend, UserProfile, normalize_role,
};
pub use error::{DomainError, DomainResult};
pub use request::{ApiRequest, HttpMethod, RequestBody};
pub use response::ApiResponse;
pub use settings::AuthSettings;
pub use state::{LifecyclePhase, SessionSnapshot};
