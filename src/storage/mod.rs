//! Flat JSON file stores for session history and saved profiles.
//!
//! Both stores keep a single pretty-printed JSON array on disk. A missing
//! file reads as empty; so does a corrupt one, with a warning.

pub mod profiles;
pub mod sessions;

pub use profiles::{JsonProfileStore, ProfileStore};
pub use sessions::{JsonSessionStore, SessionRecord, SessionStore, MAX_SESSIONS};

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read a JSON array from `path`. Missing or unreadable content yields `[]`.
pub(crate) fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str(&content) {
        Ok(items) => Ok(items),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt store file, treating as empty");
            Ok(Vec::new())
        }
    }
}

/// Write `items` as a pretty-printed JSON array, creating parent directories.
pub(crate) fn write_array<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(items)?;
    std::fs::write(path, content)?;
    Ok(())
}
