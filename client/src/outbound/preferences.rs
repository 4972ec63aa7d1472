//! File-backed preference store.
//!
//! Preferences live in one small JSON object on disk. Writes go through a
//! temp-file-and-rename so a crash mid-write can never leave the file half
//! written; readers either see the old map or the new one.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::domain::ports::{PreferenceStore, PreferenceStoreError};

/// Preference store persisting to a JSON file.
pub struct JsonFilePreferenceStore {
    path: PathBuf,
}

impl JsonFilePreferenceStore {
    /// Build a store over the given file path. The file (and its parent
    /// directory) need not exist yet; the first write creates them.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, PreferenceStoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(PreferenceStoreError::io(err.to_string())),
        };
        serde_json::from_str(&contents)
            .map_err(|err| PreferenceStoreError::corrupt(err.to_string()))
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceStoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|err| PreferenceStoreError::io(err.to_string()))?;

        let encoded = serde_json::to_vec_pretty(values)
            .map_err(|err| PreferenceStoreError::io(err.to_string()))?;

        let mut staged = NamedTempFile::new_in(&parent)
            .map_err(|err| PreferenceStoreError::io(err.to_string()))?;
        staged
            .write_all(&encoded)
            .map_err(|err| PreferenceStoreError::io(err.to_string()))?;
        staged
            .persist(&self.path)
            .map_err(|err| PreferenceStoreError::io(err.to_string()))?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceStoreError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError> {
        let mut values = self.load()?;
        values.insert(key.to_owned(), value.to_owned());
        self.persist(&values)
    }
}
