//! Warden Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, and a runtime that wires them
//! to the session core.

pub mod adapters;
pub mod persistence;
pub mod runtime;
pub mod serialization;

pub use adapters::{RecordingNavigator, ReqwestTransport, SystemClock};
pub use persistence::{
    API_BASE_URL_ENV, AuthSettingsRepository, FileStorage, MemoryStorage, STORAGE_FILE_NAME,
    SettingsError, apply_env_override,
};
pub use runtime::{RuntimeError, SessionRuntime};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
