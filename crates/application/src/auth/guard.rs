//! Route guard bound to the published session state.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};
use warden_domain::{AuthSettings, GuardState, RouteGuard, RouteRequirement, SessionSnapshot};

/// Evaluates one route's requirement against live session snapshots.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    guard: RouteGuard,
    state: watch::Receiver<Arc<SessionSnapshot>>,
}

impl SessionGuard {
    /// Creates a guard for `requirement` fed by `state`.
    #[must_use]
    pub fn new(
        requirement: RouteRequirement,
        settings: &AuthSettings,
        state: watch::Receiver<Arc<SessionSnapshot>>,
    ) -> Self {
        Self {
            guard: RouteGuard::new(requirement, settings),
            state,
        }
    }

    /// The underlying pure guard.
    #[must_use]
    pub const fn route_guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Evaluates against the latest snapshot without waiting.
    ///
    /// Returns [`GuardState::Loading`] while restore is still running.
    #[must_use]
    pub fn check(&self, attempted: &str) -> GuardState {
        let snapshot = Arc::clone(&self.state.borrow());
        self.evaluate(&snapshot, attempted)
    }

    /// Waits for restore to complete, then evaluates.
    ///
    /// If the session manager goes away before restore finishes, the
    /// last published snapshot is used.
    pub async fn resolve(&mut self, attempted: &str) -> GuardState {
        let waited = self
            .state
            .wait_for(|snapshot| snapshot.restore_complete())
            .await
            .map(|snapshot| Arc::clone(&snapshot));
        let snapshot = match waited {
            Ok(snapshot) => snapshot,
            Err(_) => {
                debug!("session state closed before restore completed");
                Arc::clone(&self.state.borrow())
            }
        };
        self.evaluate(&snapshot, attempted)
    }

    fn evaluate(&self, snapshot: &SessionSnapshot, attempted: &str) -> GuardState {
        let state = self.guard.evaluate(snapshot, attempted);
        if let GuardState::Unauthorized { decision, .. } = &state {
            warn!(
                path = attempted,
                role = snapshot.role.as_deref().unwrap_or(""),
                ?decision,
                "access denied"
            );
        }
        state
    }
}
