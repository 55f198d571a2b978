//! In-process navigator adapter

use parking_lot::RwLock;
use tracing::info;
use warden_application::ports::Navigator;

/// Navigator for hosts without a router of their own.
///
/// Tracks the current path and keeps every navigation in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    current: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl RecordingNavigator {
    /// Creates a navigator showing `path`.
    #[must_use]
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(path.into()),
            history: RwLock::default(),
        }
    }

    /// Moves to `path` without recording it as a forced navigation.
    pub fn visit(&self, path: impl Into<String>) {
        *self.current.write() = path.into();
    }

    /// Every path passed to [`Navigator::navigate`], oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.read().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current.read().clone()
    }

    fn navigate(&self, path: &str) {
        info!(path, "navigating");
        *self.current.write() = path.to_string();
        self.history.write().push(path.to_string());
    }
}
