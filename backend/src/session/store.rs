//! Archive persistence
//!
//! The stand persists two things: the day-keyed archive map and the
//! last-known-date marker. Backends implement [`ArchiveStore`];
//! [`MemoryStore`] keeps them as JSON strings the way a key/value device
//! store would.

use crate::rollover::archive::DailyArchive;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key holding the serialized archive
pub const ARCHIVE_KEY: &str = "taxi_stand_daily";

/// Key holding the last-known operational day
pub const CURRENT_DATE_KEY: &str = "taxi_stand_current_date";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store backend failure: {0}")]
    Backend(String),

    #[error("Stored archive is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Where the archive and day marker live between sessions
pub trait ArchiveStore {
    fn load_archive(&self) -> Result<DailyArchive, StoreError>;

    fn save_archive(&mut self, archive: &DailyArchive) -> Result<(), StoreError>;

    fn load_current_date(&self) -> Result<Option<String>, StoreError>;

    fn save_current_date(&mut self, date: &str) -> Result<(), StoreError>;
}

/// In-process store of JSON strings
///
/// Clones share the same slots, so a test can reopen a stand on the same
/// data to simulate a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value for `key`
    pub fn raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self.lock()?;
        Ok(slots.get(key).cloned())
    }

    /// Overwrite `key` with a raw value
    pub fn put_raw(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut slots = self.lock()?;
        slots.insert(key.to_string(), value);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.slots
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl ArchiveStore for MemoryStore {
    fn load_archive(&self) -> Result<DailyArchive, StoreError> {
        match self.raw(ARCHIVE_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(DailyArchive::new()),
        }
    }

    fn save_archive(&mut self, archive: &DailyArchive) -> Result<(), StoreError> {
        let json = serde_json::to_string(archive)?;
        self.put_raw(ARCHIVE_KEY, json)
    }

    fn load_current_date(&self) -> Result<Option<String>, StoreError> {
        self.raw(CURRENT_DATE_KEY)
    }

    fn save_current_date(&mut self, date: &str) -> Result<(), StoreError> {
        self.put_raw(CURRENT_DATE_KEY, date.to_string())
    }
}
