//! Role and permission decisions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::auth::{UserProfile, is_admin_role, is_public_role, normalize_role_name};

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Access granted.
    Allow,
    /// The user's role is on the public blocklist.
    DenyPublic,
    /// No user, or the role/permission requirement is not met.
    DenyRole,
}

impl AccessDecision {
    /// Returns true if access is granted.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Pure access-control rules.
///
/// Evaluation order matters: the public blocklist is checked before the
/// admin bypass and before any allow-list, so a public role is denied even
/// when a route explicitly lists it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Decides whether `user` may enter a route guarded by `required_roles`
    /// and, optionally, `required_permission`.
    ///
    /// An empty `required_roles` set means the route is not role-restricted.
    #[must_use]
    pub fn decide(
        user: Option<&UserProfile>,
        required_roles: &BTreeSet<String>,
        required_permission: Option<&str>,
    ) -> AccessDecision {
        let Some(user) = user else {
            return AccessDecision::DenyRole;
        };

        let role = user.normalized_role().unwrap_or_default();

        if is_public_role(&role) {
            return AccessDecision::DenyPublic;
        }

        if is_admin_role(&role) {
            return AccessDecision::Allow;
        }

        let role_ok = required_roles.is_empty()
            || required_roles
                .iter()
                .any(|required| normalize_role_name(required) == role);
        if !role_ok {
            return AccessDecision::DenyRole;
        }

        match required_permission {
            Some(code) if !user.permissions.contains(code) => AccessDecision::DenyRole,
            _ => AccessDecision::Allow,
        }
    }

    /// Permission-only check: admins always pass, everyone else needs the code.
    #[must_use]
    pub fn has_permission(user: Option<&UserProfile>, code: &str) -> bool {
        user.is_some_and(|user| {
            user.normalized_role().is_some_and(|role| is_admin_role(&role))
                || user.permissions.contains(code)
        })
    }

    /// Whether the user gets the admin bypass.
    #[must_use]
    pub fn is_admin(user: Option<&UserProfile>) -> bool {
        user.and_then(UserProfile::normalized_role)
            .is_some_and(|role| is_admin_role(&role))
    }
}
