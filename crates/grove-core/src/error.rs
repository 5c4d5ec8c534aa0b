//! Core error types for grove-core.
//!
//! Storage backends and the settings loader report failures through these
//! types. The session engine itself never propagates them: it logs and keeps
//! running in memory.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for grove-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Durable store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Settings file errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Durable store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Store is locked")]
    Locked,

    /// Record could not be encoded or decoded
    #[error("Record codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Store is deliberately unavailable (quota, disabled storage)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Settings file errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write the settings file
    #[error("Failed to access settings at {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML for the expected shape
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
