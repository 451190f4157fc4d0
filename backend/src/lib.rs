//! Taxi Stand Core - queue rotation and fare ledger engine
//!
//! Tracks taxi mobiles rotating through three dispatch lanes at a stand,
//! recording fares and the day's cash total.
//!
//! # Architecture
//!
//! - **core**: Operational timezone and clocks
//! - **config**: Stand policy knobs
//! - **models**: Domain types (MobileUnit, FareRecord, QueueState, AppState)
//! - **engine**: Commands, the pure transition function and the snapshot format
//! - **rollover**: Day-keyed archive and the day rollover policy
//! - **session**: `Stand`, which applies commands and keeps the archive current
//! - **stats**: Daily and monthly figures
//! - **roles**: Operator permission table
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. `cash_total == Σ unit.total_amount == Σ fare.amount` after every command
//! 3. A mobile appears at most once per lane, and only if it has a unit entry

// Module declarations
pub mod config;
pub mod core;
pub mod engine;
pub mod models;
pub mod roles;
pub mod rollover;
pub mod session;
pub mod stats;

// Re-exports for convenience
pub use config::{ConfigError, StandConfig};
pub use crate::core::clock::{Clock, ManualClock, OperationalTimezone, SystemClock};
pub use engine::{
    snapshot_digest, AppStateSnapshot, Command, CommandError, Engine, ErrorKind,
    MobileUnitSnapshot, SnapshotError,
};
pub use models::{
    money::{format_amount, parse_amount},
    AppState, FareRecord, InvariantViolation, MobileUnit, QueueCounts, QueueKind, QueueState,
};
pub use rollover::{DailyArchive, DailyArchiveEntry, RolloverDecision};
pub use session::{
    ArchiveStore, MemoryMirror, MemoryStore, RefreshOutcome, RemoteMirror, Stand, StandError,
    StoreError, SyncError,
};
pub use stats::{DailyStatistics, MonthlySummary};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn taxi_stand_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::stand::PyStand>()?;
    Ok(())
}
