//! Navigation port

/// Port onto the UI shell's router.
pub trait Navigator: Send + Sync {
    /// Path currently displayed.
    fn current_path(&self) -> String;

    /// Replaces the current location with `path`.
    fn navigate(&self, path: &str);
}
