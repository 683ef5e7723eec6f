use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{read_array, write_array, StorageError};
use crate::pipeline::{truncate_chars, PipelineResult};
use crate::render::to_markdown;

/// Most sessions kept on disk; older ones are dropped on append.
pub const MAX_SESSIONS: usize = 100;

const PREVIEW_CHARS: usize = 100;

/// Summary of one explanation run kept in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub ts: NaiveDateTime,
    pub concept_preview: String,
    /// Rendered Markdown of the full result.
    pub result: String,
    pub confidence: u8,
}

impl SessionRecord {
    pub fn from_result(result: &PipelineResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            ts: result.timestamp,
            concept_preview: truncate_chars(&result.concept, PREVIEW_CHARS),
            result: to_markdown(result),
            confidence: result.confidence,
        }
    }
}

/// History port. Index 0 is the newest session.
pub trait SessionStore {
    fn append(&self, record: SessionRecord) -> Result<(), StorageError>;
    fn list(&self) -> Result<Vec<SessionRecord>, StorageError>;
    fn get(&self, index: usize) -> Result<Option<SessionRecord>, StorageError>;
    /// Returns the removed record, `None` when the index is out of range.
    fn remove(&self, index: usize) -> Result<Option<SessionRecord>, StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Session history in one JSON file.
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the app data directory.
    pub fn open_default() -> Self {
        Self::new(crate::config::sessions_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonSessionStore {
    fn append(&self, record: SessionRecord) -> Result<(), StorageError> {
        let mut sessions: Vec<SessionRecord> = read_array(&self.path)?;
        sessions.insert(0, record);
        sessions.truncate(MAX_SESSIONS);
        write_array(&self.path, &sessions)?;
        tracing::debug!(count = sessions.len(), "Session appended");
        Ok(())
    }

    fn list(&self) -> Result<Vec<SessionRecord>, StorageError> {
        read_array(&self.path)
    }

    fn get(&self, index: usize) -> Result<Option<SessionRecord>, StorageError> {
        Ok(self.list()?.into_iter().nth(index))
    }

    fn remove(&self, index: usize) -> Result<Option<SessionRecord>, StorageError> {
        let mut sessions = self.list()?;
        if index >= sessions.len() {
            return Ok(None);
        }
        let removed = sessions.remove(index);
        write_array(&self.path, &sessions)?;
        Ok(Some(removed))
    }

    fn clear(&self) -> Result<(), StorageError> {
        write_array::<SessionRecord>(&self.path, &[])
    }
}
