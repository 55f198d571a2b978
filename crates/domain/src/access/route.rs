//! Route admission state machine.
//!
//! A guard never evaluates policy before boot restore has completed, so a
//! reload never flashes a redirect to the login surface while storage is
//! still being read.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::policy::{AccessDecision, AccessPolicy};
use crate::auth::{UserProfile, normalize_role_name};
use crate::settings::AuthSettings;
use crate::state::SessionSnapshot;

/// What a route declares it needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteRequirement {
    /// Allowed roles, lower-cased. Empty means any non-public role.
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Permission code required on top of the role check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

impl RouteRequirement {
    /// Any signed-in, non-public user.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Restricts the route to the given roles.
    #[must_use]
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roles: roles
                .into_iter()
                .map(|role| normalize_role_name(role.as_ref()))
                .collect(),
            permission: None,
        }
    }

    /// The admin panel's role set from settings.
    #[must_use]
    pub fn admin_panel(settings: &AuthSettings) -> Self {
        Self::roles(&settings.admin_panel_roles)
    }

    /// Adds a required permission code.
    #[must_use]
    pub fn with_permission(mut self, code: impl Into<String>) -> Self {
        self.permission = Some(code.into());
        self
    }

    /// Runs the access policy for this requirement.
    #[must_use]
    pub fn decide(&self, user: Option<&UserProfile>) -> AccessDecision {
        AccessPolicy::decide(user, &self.roles, self.permission.as_deref())
    }
}

/// Where a guarded navigation stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardState {
    /// Restore still running; show a neutral loading indicator.
    Loading,
    /// No session; go to the login surface and come back afterwards.
    Unauthenticated {
        /// Login surface.
        redirect_to: String,
        /// Destination to return to after login.
        return_to: String,
    },
    /// Signed in but not allowed here.
    Unauthorized {
        /// Default landing surface.
        redirect_to: String,
        /// Why access was refused.
        decision: AccessDecision,
    },
    /// Render the guarded content.
    Authorized,
}

impl GuardState {
    /// Whether the guard has reached a final decision.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// Whether the guarded content may render.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// The redirect target, if the navigation is refused.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { redirect_to, .. } | Self::Unauthorized { redirect_to, .. } => {
                Some(redirect_to)
            }
            Self::Loading | Self::Authorized => None,
        }
    }
}

/// Admits or redirects navigation to one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    requirement: RouteRequirement,
    login_path: String,
    landing_path: String,
}

impl RouteGuard {
    /// Creates a guard using the login and landing routes from settings.
    #[must_use]
    pub fn new(requirement: RouteRequirement, settings: &AuthSettings) -> Self {
        Self {
            requirement,
            login_path: settings.login_path.clone(),
            landing_path: settings.landing_path.clone(),
        }
    }

    /// The route's requirement.
    #[must_use]
    pub const fn requirement(&self) -> &RouteRequirement {
        &self.requirement
    }

    /// Evaluates a navigation to `attempted` against a published snapshot.
    #[must_use]
    pub fn evaluate(&self, snapshot: &SessionSnapshot, attempted: &str) -> GuardState {
        if !snapshot.restore_complete() {
            return GuardState::Loading;
        }

        let Some(user) = snapshot.user() else {
            return GuardState::Unauthenticated {
                redirect_to: self.login_path.clone(),
                return_to: attempted.to_string(),
            };
        };

        match self.requirement.decide(Some(user)) {
            AccessDecision::Allow => GuardState::Authorized,
            decision => GuardState::Unauthorized {
                redirect_to: self.landing_path.clone(),
                decision,
            },
        }
    }
}
