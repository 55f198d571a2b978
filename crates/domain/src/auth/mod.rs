//! Authentication domain types

mod claims;
mod profile;
mod role;
mod types;

pub use claims::{DecodeError, SessionDecoder};
pub use profile::{RoleObject, RoleRef, UserProfile};
pub use role::{
    ADMIN_ROLES, PUBLIC_ROLES, is_admin_role, is_public_role, normalize_role, normalize_role_name,
};
pub use types::{
    Credential, LoginPayload, Session, StorageBackend, bearer_header, token_preview,
};
