//! Wiring of the session core onto concrete adapters.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use warden_application::auth::{
    AuthSessionManager, CredentialStore, InterceptedTransport, SessionGuard, SessionSignal,
    TransportInterceptor,
};
use warden_application::ports::{
    Clock, HttpTransport, Navigator, StorageArea, StorageError, TransportError,
};
use warden_application::use_cases::{FederatedSignIn, PasswordSignIn, RegisterAccount};
use warden_domain::{AuthSettings, RouteRequirement, SessionSnapshot};

use crate::adapters::{ReqwestTransport, SystemClock};
use crate::persistence::{FileStorage, MemoryStorage};

/// Errors raised while assembling a runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The persistent storage area could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The HTTP transport could not be created.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// The session core with every collaborator attached.
pub struct SessionRuntime<T> {
    manager: Arc<AuthSessionManager>,
    transport: Arc<InterceptedTransport<T>>,
    signals: Option<mpsc::UnboundedReceiver<SessionSignal>>,
}

impl SessionRuntime<ReqwestTransport> {
    /// Builds a runtime on the default adapters: file-backed persistent
    /// storage, in-memory ephemeral storage, the system clock and reqwest.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be opened or the base URL is
    /// invalid.
    pub fn open_default(
        settings: AuthSettings,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, RuntimeError> {
        let persistent = Arc::new(FileStorage::open_default()?);
        let transport = ReqwestTransport::new(&settings)?;
        Ok(Self::assemble(
            settings,
            persistent,
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock::new()),
            navigator,
            transport,
        ))
    }
}

impl<T: HttpTransport + 'static> SessionRuntime<T> {
    /// Connects the store, interceptor and manager around `transport`.
    #[must_use]
    pub fn assemble(
        settings: AuthSettings,
        persistent: Arc<dyn StorageArea>,
        ephemeral: Arc<dyn StorageArea>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
        transport: T,
    ) -> Self {
        let settings = Arc::new(settings);
        let store = CredentialStore::new(persistent, ephemeral, &settings);
        let (tx, rx) = mpsc::unbounded_channel();

        let interceptor = TransportInterceptor::new(store.clone(), Arc::clone(&settings), tx);
        let manager = AuthSessionManager::new(store, clock, navigator, settings);

        Self {
            manager: Arc::new(manager),
            transport: Arc::new(interceptor.wrap(transport)),
            signals: Some(rx),
        }
    }

    /// Restores the session and starts handling rejection signals.
    ///
    /// The signal task is started once, on the ambient Tokio runtime.
    /// Outside a runtime no task is spawned and a later call from inside
    /// one starts it.
    pub fn start(&mut self) -> (Arc<SessionSnapshot>, Option<JoinHandle<()>>) {
        let snapshot = self.manager.restore();
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => self
                .signals
                .take()
                .map(|signals| runtime.spawn(Arc::clone(&self.manager).run_signals(signals))),
            Err(_) => {
                warn!("no tokio runtime; credential rejections are not handled yet");
                None
            }
        };
        info!(
            authenticated = snapshot.is_authenticated(),
            "session runtime started"
        );
        (snapshot, handle)
    }

    /// The session manager.
    #[must_use]
    pub const fn manager(&self) -> &Arc<AuthSessionManager> {
        &self.manager
    }

    /// The authenticated transport every request should go through.
    #[must_use]
    pub const fn transport(&self) -> &Arc<InterceptedTransport<T>> {
        &self.transport
    }

    /// Password sign-in over the authenticated transport.
    #[must_use]
    pub fn password_sign_in(&self) -> PasswordSignIn<Arc<InterceptedTransport<T>>> {
        PasswordSignIn::new(Arc::clone(&self.transport), Arc::clone(&self.manager))
    }

    /// Federated sign-in over the authenticated transport.
    #[must_use]
    pub fn federated_sign_in(&self) -> FederatedSignIn<Arc<InterceptedTransport<T>>> {
        FederatedSignIn::new(Arc::clone(&self.transport), Arc::clone(&self.manager))
    }

    /// Registration over the authenticated transport.
    #[must_use]
    pub fn register(&self) -> RegisterAccount<Arc<InterceptedTransport<T>>> {
        RegisterAccount::new(Arc::clone(&self.transport), self.manager.settings())
    }

    /// A guard for `requirement` bound to this runtime's session state.
    #[must_use]
    pub fn guard(&self, requirement: RouteRequirement) -> SessionGuard {
        SessionGuard::new(requirement, self.manager.settings(), self.manager.subscribe())
    }

    /// A guard for the admin panel.
    #[must_use]
    pub fn admin_guard(&self) -> SessionGuard {
        self.guard(RouteRequirement::admin_panel(self.manager.settings()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::RecordingNavigator;

    fn runtime() -> SessionRuntime<ReqwestTransport> {
        let settings = AuthSettings::default();
        let transport = ReqwestTransport::new(&settings).unwrap();
        SessionRuntime::assemble(
            settings,
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock::new()),
            Arc::new(RecordingNavigator::at("/")),
            transport,
        )
    }

    #[test]
    fn start_outside_tokio_defers_the_signal_task() {
        let mut core = runtime();

        let (snapshot, handle) = core.start();
        assert!(snapshot.restore_complete());
        assert!(handle.is_none());

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let (_, handle) = rt.block_on(async { core.start() });
        assert!(handle.is_some());

        let (_, again) = rt.block_on(async { core.start() });
        assert!(again.is_none());
    }
}
