//! Durable storage backends for the serialized application state
//!
//! The store writes the whole state under a single key on every mutation;
//! the backend only needs to hold one payload durably.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A durable key-value slot for the serialized application state.
///
/// Implementations must make `save` effective before returning so the
/// store's crash-safety guarantee holds.
pub trait StateStorage {
    /// Persist the payload, replacing any previous one.
    fn save(&mut self, payload: &str) -> Result<()>;

    /// Load the last persisted payload, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<String>>;
}

/// File-backed storage under the platform data directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write can never clobber the previous good state.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for JsonFileStorage {
    fn save(&mut self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, payload)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace state file: {}", self.path.display()))?;

        tracing::debug!("Persisted state to: {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;
        Ok(Some(content))
    }
}

/// In-memory storage for tests and hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    payload: Option<String>,
}

impl MemoryStorage {
    /// Create empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn save(&mut self, payload: &str) -> Result<()> {
        self.payload = Some(payload.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        Ok(self.payload.clone())
    }
}
