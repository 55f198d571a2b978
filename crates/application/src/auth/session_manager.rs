//! Process-wide session state holder.
//!
//! [`AuthSessionManager`] is the single writer of session state. Every
//! transition publishes a fresh [`SessionSnapshot`] on a watch channel;
//! readers hold an `Arc` to an immutable snapshot. Transitions are
//! serialized, so a restore in flight cannot overwrite a later sign-in.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use warden_domain::{
    AccessPolicy, AuthSettings, Credential, LoginPayload, Session, SessionSnapshot,
    StorageBackend, UserProfile,
};

use super::credential_store::{CredentialStore, StoredCredentials};
use super::interceptor::SessionSignal;
use crate::ports::{Clock, Navigator};

/// Owns the authenticated-user view and its transitions.
pub struct AuthSessionManager {
    store: CredentialStore,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    settings: Arc<AuthSettings>,
    state: watch::Sender<Arc<SessionSnapshot>>,
    restored: AtomicBool,
    transitions: Mutex<()>,
}

impl std::fmt::Debug for AuthSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionManager")
            .field("store", &self.store)
            .field("state", &**self.state.borrow())
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}

impl AuthSessionManager {
    /// Creates a manager in the `Uninitialized` phase.
    #[must_use]
    pub fn new(
        store: CredentialStore,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
        settings: Arc<AuthSettings>,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(SessionSnapshot::uninitialized()));
        Self {
            store,
            clock,
            navigator,
            settings,
            state,
            restored: AtomicBool::new(false),
            transitions: Mutex::new(()),
        }
    }

    /// Subscribes to published snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.state.subscribe()
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::clone(&self.state.borrow())
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// The credential store this manager writes through.
    #[must_use]
    pub const fn credential_store(&self) -> &CredentialStore {
        &self.store
    }

    fn publish(&self, snapshot: SessionSnapshot) -> Arc<SessionSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.state.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    /// Signs in with the default persistent backend.
    ///
    /// Returns `None`, leaving state untouched, when the payload lacks a
    /// token or a user.
    pub fn login(&self, payload: &LoginPayload) -> Option<Arc<SessionSnapshot>> {
        self.login_with_backend(payload, StorageBackend::Persistent)
    }

    /// Signs in, persisting into `backend`.
    pub fn login_with_backend(
        &self,
        payload: &LoginPayload,
        backend: StorageBackend,
    ) -> Option<Arc<SessionSnapshot>> {
        let (Some(token), Some(user)) = (payload.token(), payload.profile()) else {
            warn!("login payload missing token or user; ignoring");
            return None;
        };

        let _transition = self.transitions.lock();
        let credential = Credential::decode(token).unwrap_or_else(|error| {
            debug!(%error, "token carries no readable expiry");
            Credential::new(token, None)
        });

        if !self.store.write(token, user, backend) {
            warn!(%backend, "session not persisted; continuing in memory");
        }

        let session = Session::new(credential, user.clone(), backend);
        info!(
            user_id = ?user.id,
            role = ?session.role(),
            %backend,
            "signed in"
        );
        self.restored.store(true, Ordering::SeqCst);
        Some(self.publish(SessionSnapshot::signed_in(session)))
    }

    /// Clears storage and publishes "no session".
    pub fn logout(&self) -> Arc<SessionSnapshot> {
        let _transition = self.transitions.lock();
        self.sign_out()
    }

    fn sign_out(&self) -> Arc<SessionSnapshot> {
        self.store.clear();
        let had_session = self.state.borrow().is_authenticated();
        info!(had_session, "signed out");
        self.publish(SessionSnapshot::signed_out())
    }

    /// Rebuilds the session from storage. Runs once; later calls return
    /// the current snapshot.
    pub fn restore(&self) -> Arc<SessionSnapshot> {
        let _transition = self.transitions.lock();
        if self.restored.swap(true, Ordering::SeqCst) {
            debug!("restore already ran");
            return self.snapshot();
        }

        self.publish(SessionSnapshot::restoring());

        let StoredCredentials {
            token,
            user,
            backend,
        } = self.store.read();

        let (Some(token), Some(user)) = (token, user.filter(|user| !user.is_empty())) else {
            info!("no stored session");
            return self.publish(SessionSnapshot::signed_out());
        };

        let credential = match Credential::decode(token) {
            Ok(credential) => credential,
            Err(error) => {
                warn!(%error, "stored token is malformed; signing out");
                return self.sign_out();
            }
        };

        let now = self.clock.now();
        if !credential.is_valid_at(now) {
            info!(expired_at = ?credential.expires_at, "stored session expired; signing out");
            return self.sign_out();
        }

        let session = Session::new(credential, user, backend.unwrap_or_default());
        info!(
            user_id = ?session.user.id,
            role = ?session.role(),
            backend = %session.backend,
            "session restored"
        );
        self.publish(SessionSnapshot::signed_in(session))
    }

    /// Reacts to a signal raised by the transport layer.
    pub fn handle_signal(&self, signal: &SessionSignal) {
        match signal {
            SessionSignal::CredentialRejected { url } => {
                warn!(%url, "credential rejected; forcing re-authentication");
                self.logout();
                let current = self.navigator.current_path();
                if !self.settings.is_login_path(&current) {
                    self.navigator.navigate(&self.settings.login_path);
                }
            }
        }
    }

    /// Handles every signal already queued. Returns how many were handled.
    pub fn process_pending(&self, signals: &mut mpsc::UnboundedReceiver<SessionSignal>) -> usize {
        let mut handled = 0;
        while let Ok(signal) = signals.try_recv() {
            self.handle_signal(&signal);
            handled += 1;
        }
        handled
    }

    /// Handles signals until every sender is dropped.
    pub async fn run_signals(self: Arc<Self>, mut signals: mpsc::UnboundedReceiver<SessionSignal>) {
        while let Some(signal) = signals.recv().await {
            self.handle_signal(&signal);
        }
        debug!("signal channel closed");
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    /// Permission check with the admin bypass.
    #[must_use]
    pub fn has_permission(&self, code: &str) -> bool {
        AccessPolicy::has_permission(self.state.borrow().user(), code)
    }

    /// True when a token can be read from storage.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }
}
