//! Session layer: command execution, archival and collaborator seams

pub mod mirror;
pub mod stand;
pub mod store;

pub use mirror::{MemoryMirror, RefreshOutcome, RemoteMirror, SyncError};
pub use stand::{Stand, StandError};
pub use store::{ArchiveStore, MemoryStore, StoreError};
