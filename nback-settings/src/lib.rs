pub mod backend;
pub mod settings;
pub mod store;

pub use backend::{JsonFileBackend, MemoryBackend, SettingsBackend};
pub use settings::{SettingKey, Settings};
pub use store::{SettingsError, SettingsStore};
