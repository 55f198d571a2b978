//! Storage areas and settings persistence.

mod file_storage;
mod memory_storage;
mod settings_repository;

pub use file_storage::{FileStorage, STORAGE_FILE_NAME};
pub use memory_storage::MemoryStorage;
pub use settings_repository::{
    API_BASE_URL_ENV, AuthSettingsRepository, SettingsError, apply_env_override,
};
