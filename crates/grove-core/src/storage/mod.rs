mod memory;
pub mod record;
mod settings;
mod sqlite;

pub use memory::MemoryStore;
pub use record::{PersistedRecord, StoredRecord, STORAGE_KEY};
pub use settings::{BackgroundPolicy, CliSettings, EngineSettings, Settings};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::{SettingsError, StoreError};

/// Opaque durable key-value storage.
///
/// The engine is the only writer; it always writes the whole merged record
/// under a single key.
pub trait StateStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).save(key, value)
    }
}

/// Returns the data directory.
///
/// `GROVE_DATA_DIR` wins when set; otherwise `~/.config/grove[-dev]/`
/// depending on `GROVE_ENV`. The directory is created if missing.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, SettingsError> {
    let dir = match std::env::var_os("GROVE_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GROVE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("grove-dev")
            } else {
                base_dir.join("grove")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| SettingsError::Access {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
