//! Domain models for the dispatch stand

pub mod fare;
pub mod mobile;
pub mod money;
pub mod queues;
pub mod state;

// Re-exports
pub use fare::{FareRecord, QueueKind};
pub use mobile::{MobileUnit, QueueCounts};
pub use queues::QueueState;
pub use state::{AppState, InvariantViolation};
