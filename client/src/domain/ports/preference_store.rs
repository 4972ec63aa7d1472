//! Driven port for the local durable preference store.
//!
//! A tiny string-valued key/value surface, enough for device-local flags
//! such as the monthly reminder toggle. Synchronous by design: backing
//! implementations are local (file, in-memory), never remote.

use std::collections::HashMap;
use std::sync::Mutex;

/// Errors surfaced by preference store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferenceStoreError {
    /// Reading or writing the backing storage failed.
    #[error("preference store io failed: {message}")]
    Io { message: String },
    /// The stored payload could not be parsed.
    #[error("preference store payload corrupt: {message}")]
    Corrupt { message: String },
}

impl PreferenceStoreError {
    /// Build a [`PreferenceStoreError::Io`].
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Build a [`PreferenceStoreError::Corrupt`].
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// Port for string-valued device-local preferences.
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError>;
}

/// In-memory fixture store.
#[derive(Debug, Default)]
pub struct FixturePreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for FixturePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceStoreError> {
        let values = self
            .values
            .lock()
            .map_err(|_| PreferenceStoreError::io("preference map poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| PreferenceStoreError::io("preference map poisoned"))?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn fixture_round_trips_values() {
        let store = FixturePreferenceStore::default();
        assert_eq!(store.get("missing").expect("get succeeds"), None);

        store.set("flag", "true").expect("set succeeds");
        assert_eq!(
            store.get("flag").expect("get succeeds"),
            Some("true".to_owned())
        );

        store.set("flag", "false").expect("set succeeds");
        assert_eq!(
            store.get("flag").expect("get succeeds"),
            Some("false".to_owned())
        );
    }
}
