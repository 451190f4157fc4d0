//! Remote mirror
//!
//! A best-effort copy of the current day's snapshot kept on a remote
//! service. Pushes never block or roll back local transitions. A pull that
//! disagrees with local state replaces it wholesale (last writer wins at the
//! snapshot level); there is no field-level merge.

use crate::engine::snapshot;
use crate::models::state::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Remote mirror unavailable: {0}")]
    Unavailable(String),

    #[error("Remote snapshot rejected: {0}")]
    Rejected(String),
}

/// Remote copy of daily snapshots
pub trait RemoteMirror {
    fn push(&mut self, date: &str, state: &AppState) -> Result<(), SyncError>;

    /// Latest remote snapshot for `date`, if any
    fn pull(&mut self, date: &str) -> Result<Option<AppState>, SyncError>;
}

/// What a refresh from the mirror did to local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Remote matches local
    Unchanged,
    /// Local state was replaced by the remote snapshot
    Replaced,
    /// The mirror has nothing for today
    NoRemoteData,
    /// The pull failed; local state untouched
    Failed,
}

/// In-process mirror holding serialized snapshots
///
/// Clones share storage, so two stands can be pointed at one mirror. It can
/// be switched offline to exercise failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    snapshots: Arc<Mutex<HashMap<String, String>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Unavailable("mirror offline".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, SyncError> {
        self.snapshots
            .lock()
            .map_err(|_| SyncError::Unavailable("mirror lock poisoned".to_string()))
    }
}

impl RemoteMirror for MemoryMirror {
    fn push(&mut self, date: &str, state: &AppState) -> Result<(), SyncError> {
        self.ensure_online()?;
        let json = snapshot::to_json(state).map_err(|e| SyncError::Rejected(e.to_string()))?;
        self.lock()?.insert(date.to_string(), json);
        Ok(())
    }

    fn pull(&mut self, date: &str) -> Result<Option<AppState>, SyncError> {
        self.ensure_online()?;
        let raw = self.lock()?.get(date).cloned();
        raw.map(|json| snapshot::from_json(&json).map_err(|e| SyncError::Rejected(e.to_string())))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_mirror_fails() {
        let mut mirror = MemoryMirror::new();
        mirror.set_offline(true);
        assert!(matches!(
            mirror.push("2026-03-10", &AppState::new()),
            Err(SyncError::Unavailable(_))
        ));
        assert!(mirror.pull("2026-03-10").is_err());
    }

    #[test]
    fn test_push_then_pull() {
        let mut mirror = MemoryMirror::new();
        mirror.push("2026-03-10", &AppState::new()).unwrap();
        assert_eq!(mirror.pull("2026-03-10").unwrap(), Some(AppState::new()));
        assert_eq!(mirror.pull("2026-03-11").unwrap(), None);
    }
}
