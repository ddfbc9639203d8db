//! Core configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Quiet period before a scheduled backup snapshot fires, in milliseconds
    pub backup_debounce_ms: u64,
    /// How long the undo toast for a substitution stays actionable, in milliseconds
    pub undo_toast_ms: u64,
    /// Override for the durable state file (defaults to the platform data dir)
    pub state_file: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            backup_debounce_ms: 3000,
            undo_toast_ms: 5000,
            state_file: None,
        }
    }
}

impl CoreConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "escriba", "Escriba")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Default location of the durable state file
    pub fn default_state_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "escriba", "Escriba")
            .map(|dirs| dirs.data_dir().join("state.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Debounce delay as a [`Duration`]
    pub fn backup_debounce(&self) -> Duration {
        Duration::from_millis(self.backup_debounce_ms)
    }

    /// Undo toast lifetime as a [`Duration`]
    pub fn undo_toast(&self) -> Duration {
        Duration::from_millis(self.undo_toast_ms)
    }
}
