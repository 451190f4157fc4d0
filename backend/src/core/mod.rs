//! Time and calendar plumbing

pub mod clock;
