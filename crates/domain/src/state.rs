//! Published session state.
//!
//! A [`SessionSnapshot`] is immutable once published; every transition
//! builds a fresh snapshot so readers never see a partial update.

use std::collections::BTreeSet;

use crate::auth::{Session, UserProfile};

/// Boot lifecycle of the session holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecyclePhase {
    /// Nothing has been read from storage yet.
    #[default]
    Uninitialized,
    /// Restore is running; authorization is undecided.
    Restoring,
    /// Restore has completed; the snapshot is authoritative.
    Ready,
}

/// Point-in-time view of the authenticated user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    /// Current lifecycle phase.
    pub phase: LifecyclePhase,
    /// The session, if any.
    pub session: Option<Session>,
    /// Canonical lower-cased role.
    pub role: Option<String>,
    /// Permission codes (empty when signed out).
    pub permissions: BTreeSet<String>,
    /// Whether the admin bypass applies.
    pub is_admin: bool,
}

impl SessionSnapshot {
    /// Snapshot before restore has started.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Snapshot while restore is in flight.
    #[must_use]
    pub fn restoring() -> Self {
        Self {
            phase: LifecyclePhase::Restoring,
            ..Self::default()
        }
    }

    /// Ready snapshot with no session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            phase: LifecyclePhase::Ready,
            ..Self::default()
        }
    }

    /// Ready snapshot for an authenticated session.
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        Self {
            phase: LifecyclePhase::Ready,
            role: session.role(),
            permissions: session.permissions().clone(),
            is_admin: session.is_admin(),
            session: Some(session),
        }
    }

    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Whether a session is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether boot restore has completed.
    #[must_use]
    pub fn restore_complete(&self) -> bool {
        self.phase == LifecyclePhase::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, StorageBackend};
    use pretty_assertions::assert_eq;

    #[test]
    fn signed_in_derives_role_and_permissions() {
        let user = UserProfile::new(4)
            .with_role("Editor")
            .with_permissions(["POST_CREATE"]);
        let snapshot = SessionSnapshot::signed_in(Session::new(
            Credential::new("t", None),
            user.clone(),
            StorageBackend::Ephemeral,
        ));

        assert!(snapshot.restore_complete());
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.role.as_deref(), Some("editor"));
        assert!(snapshot.permissions.contains("POST_CREATE"));
        assert!(!snapshot.is_admin);
        assert_eq!(snapshot.user(), Some(&user));
    }

    #[test]
    fn phases() {
        assert!(!SessionSnapshot::uninitialized().restore_complete());
        assert!(!SessionSnapshot::restoring().restore_complete());
        let signed_out = SessionSnapshot::signed_out();
        assert!(signed_out.restore_complete());
        assert!(!signed_out.is_authenticated());
        assert_eq!(signed_out.role, None);
    }
}
