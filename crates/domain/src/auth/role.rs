//! Role normalization shared by every authorization consumer.

use super::profile::RoleRef;

/// Roles that bypass every role and permission check.
pub const ADMIN_ROLES: [&str; 2] = ["admin", "superadmin"];

/// Unprivileged end-user roles that may never reach the admin surface.
pub const PUBLIC_ROLES: [&str; 4] = ["student", "member", "user", "public"];

/// Normalizes a role reference to its canonical lower-cased name.
///
/// Returns `None` when there is no role, or the role carries no usable name.
#[must_use]
pub fn normalize_role(role: Option<&RoleRef>) -> Option<String> {
    role.and_then(RoleRef::name)
        .map(normalize_role_name)
        .filter(|name| !name.is_empty())
}

/// Lower-cases a bare role name.
#[must_use]
pub fn normalize_role_name(name: &str) -> String {
    name.to_lowercase()
}

/// Whether a normalized role gets the admin bypass.
#[must_use]
pub fn is_admin_role(normalized: &str) -> bool {
    ADMIN_ROLES.contains(&normalized)
}

/// Whether a normalized role is on the public blocklist.
#[must_use]
pub fn is_public_role(normalized: &str) -> bool {
    PUBLIC_ROLES.contains(&normalized)
}
