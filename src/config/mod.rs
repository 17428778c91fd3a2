//! Configuration loading.

mod settings;

pub use settings::{expand_env_vars, Settings, SettingsError, StorageSettings};
