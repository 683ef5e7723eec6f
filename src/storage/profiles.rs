use std::path::{Path, PathBuf};

use super::{read_array, write_array, StorageError};
use crate::models::Profile;

/// Saved audience profiles, unique by name.
pub trait ProfileStore {
    fn list(&self) -> Result<Vec<Profile>, StorageError>;
    /// Insert or replace the profile with the same name. Returns the stored profile.
    fn save(&self, profile: Profile) -> Result<Profile, StorageError>;
    fn find(&self, name: &str) -> Result<Option<Profile>, StorageError>;
}

pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Self {
        Self::new(crate::config::profiles_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for JsonProfileStore {
    fn list(&self) -> Result<Vec<Profile>, StorageError> {
        read_array(&self.path)
    }

    fn save(&self, mut profile: Profile) -> Result<Profile, StorageError> {
        if profile.created_at.is_none() {
            profile.created_at = Some(chrono::Local::now().naive_local());
        }

        let mut profiles: Vec<Profile> = self
            .list()?
            .into_iter()
            .filter(|p| p.name != profile.name)
            .collect();
        profiles.push(profile.clone());
        write_array(&self.path, &profiles)?;

        tracing::info!(name = %profile.name, total = profiles.len(), "Profile saved");
        Ok(profile)
    }

    fn find(&self, name: &str) -> Result<Option<Profile>, StorageError> {
        let name = name.trim();
        Ok(self.list()?.into_iter().find(|p| p.name == name))
    }
}
