//! Configuration and persisted state

pub mod config;
pub mod store;

pub use config::{ConfigError, ConfigResult, TrackerConfig};
pub use store::{JsonFileStore, MemoryStore, PersistedToggles, StoreError, StoreResult, ToggleStore};
