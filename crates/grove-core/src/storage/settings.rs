//! TOML-based host settings.
//!
//! These configure the host around the engine (background policy, write
//! throttling, terminal refresh rate). The session durations themselves live
//! in the persisted session record, not here.
//!
//! Settings are stored at `<data_dir>/settings.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::SettingsError;

/// What to do with time that passed while frames were not being delivered
/// (hidden window, suspended process).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundPolicy {
    /// Drop the hidden duration and continue from where the countdown was.
    #[default]
    Reanchor,
    /// Pull the countdown in line with the predicted wall-clock end.
    Reconcile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub background_policy: BackgroundPolicy,
    /// Minimum spacing of record writes caused by frame ticks alone.
    #[serde(default = "default_persist_interval_ms")]
    pub persist_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Ring the terminal bell when an interval completes.
    #[serde(default = "default_true")]
    pub bell: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub cli: CliSettings,
}

fn default_persist_interval_ms() -> u64 {
    1000
}
fn default_fps() -> u32 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            background_policy: BackgroundPolicy::default(),
            persist_interval_ms: default_persist_interval_ms(),
        }
    }
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            bell: true,
        }
    }
}

impl Settings {
    pub fn path() -> Result<PathBuf, SettingsError> {
        Ok(data_dir()?.join("settings.toml"))
    }

    /// Load from the default location, or return defaults if the file does
    /// not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Access {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| SettingsError::Access {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable settings");
                Self::default()
            }
        }
    }
}
