//! Day-boundary archival and rollover

pub mod archive;
pub mod policy;

pub use archive::{DailyArchive, DailyArchiveEntry};
pub use policy::{start_day, RolloverDecision, SessionStart};
