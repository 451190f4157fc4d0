//! Day rollover policy
//!
//! Decides, when a session starts, whether the stored state still belongs
//! to the current operational day:
//!
//! - no marker, or marker == today: resume today's archived snapshot (or empty)
//! - marker != today: prune the archive to the retention window, start empty
//!
//! The previous day is not re-archived here; its last routine write already
//! captured it.

use crate::core::clock::retention_cutoff;
use crate::models::state::AppState;
use crate::rollover::archive::DailyArchive;
use tracing::info;

/// What the policy decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverDecision {
    /// Same day as the marker (or no marker yet)
    Resume {
        /// Whether today's snapshot was found in the archive
        restored: bool,
    },

    /// The marker names an earlier (or otherwise different) day
    NewDay {
        previous: String,
        /// Archive entries dropped by the retention window
        pruned: usize,
    },
}

/// Result of starting a session
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub today: String,
    pub state: AppState,
    pub decision: RolloverDecision,
}

/// Apply the rollover policy for `today`
///
/// # Example
/// ```
/// use taxi_stand_core_rs::rollover::{start_day, DailyArchive, RolloverDecision};
/// use taxi_stand_core_rs::AppState;
///
/// let mut archive = DailyArchive::new();
/// archive.record("2026-01-01", 0, AppState::new());
///
/// let start = start_day(Some("2026-03-09"), "2026-03-10", &mut archive, 30);
/// assert_eq!(
///     start.decision,
///     RolloverDecision::NewDay { previous: "2026-03-09".to_string(), pruned: 1 }
/// );
/// assert!(archive.is_empty());
/// ```
pub fn start_day(
    last_known_date: Option<&str>,
    today: &str,
    archive: &mut DailyArchive,
    retention_days: u32,
) -> SessionStart {
    match last_known_date {
        Some(previous) if previous != today => {
            let pruned = retention_cutoff(today, retention_days)
                .map(|cutoff| archive.prune_before(&cutoff))
                .unwrap_or(0);
            info!(previous, today, pruned, "new operational day");

            SessionStart {
                today: today.to_string(),
                state: AppState::new(),
                decision: RolloverDecision::NewDay {
                    previous: previous.to_string(),
                    pruned,
                },
            }
        }
        _ => {
            let restored = archive.get(today).map(|entry| entry.snapshot.clone());
            info!(today, restored = restored.is_some(), "resuming operational day");

            SessionStart {
                today: today.to_string(),
                decision: RolloverDecision::Resume {
                    restored: restored.is_some(),
                },
                state: restored.unwrap_or_default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_with_empty_archive() {
        let mut archive = DailyArchive::new();
        let start = start_day(None, "2026-03-10", &mut archive, 30);

        assert_eq!(start.decision, RolloverDecision::Resume { restored: false });
        assert_eq!(start.state, AppState::new());
    }

    #[test]
    fn test_new_day_ignores_existing_entry_for_today() {
        let mut archive = DailyArchive::new();
        let mut state = AppState::new();
        state.toggle_correction_mode();
        archive.record("2026-03-10", 0, state);

        let start = start_day(Some("2026-03-09"), "2026-03-10", &mut archive, 30);

        assert!(matches!(start.decision, RolloverDecision::NewDay { pruned: 0, .. }));
        assert_eq!(start.state, AppState::new());
        assert!(archive.contains("2026-03-10"));
    }
}
