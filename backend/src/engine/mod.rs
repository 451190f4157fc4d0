//! Queue/ledger engine
//!
//! - `command`: the eight commands and their error taxonomy
//! - `transition`: the pure reducer
//! - `snapshot`: the wire shape and digests

pub mod command;
pub mod snapshot;
pub mod transition;

pub use command::{validate_mobile_id, Command, CommandError, ErrorKind};
pub use snapshot::{
    compute_digest, snapshot_digest, AppStateSnapshot, MobileUnitSnapshot, SnapshotError,
};
pub use transition::Engine;
