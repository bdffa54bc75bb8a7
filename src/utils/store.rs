//! Persisted tracking and voice toggles
//!
//! Both switches survive restarts; a tracker that finds `tracking_active` set
//! on startup resumes tracking.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Toggle persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access state file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt state file '{path}': {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Values that outlive the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedToggles {
    pub tracking_active: bool,
    /// When the persisted session started (milliseconds since epoch)
    pub started_at: Option<u64>,
    pub voice_alerts_enabled: bool,
}

impl Default for PersistedToggles {
    fn default() -> Self {
        Self {
            tracking_active: false,
            started_at: None,
            voice_alerts_enabled: true,
        }
    }
}

/// Backend holding the persisted toggles
pub trait ToggleStore: Send {
    fn load(&self) -> StoreResult<PersistedToggles>;
    fn save(&mut self, toggles: &PersistedToggles) -> StoreResult<()>;
}

/// Non-persistent store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    toggles: PersistedToggles,
}

impl MemoryStore {
    pub fn new(toggles: PersistedToggles) -> Self {
        Self { toggles }
    }
}

impl ToggleStore for MemoryStore {
    fn load(&self) -> StoreResult<PersistedToggles> {
        Ok(self.toggles)
    }

    fn save(&mut self, toggles: &PersistedToggles) -> StoreResult<()> {
        self.toggles = *toggles;
        Ok(())
    }
}

/// JSON file store; a missing file reads as defaults
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

impl ToggleStore for JsonFileStore {
    fn load(&self) -> StoreResult<PersistedToggles> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PersistedToggles::default()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path_str(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path_str(),
            source,
        })
    }

    fn save(&mut self, toggles: &PersistedToggles) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(toggles).map_err(|source| StoreError::Corrupt {
            path: self.path_str(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: self.path_str(),
                source,
            })?;
        }
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path_str(),
            source,
        })
    }
}
