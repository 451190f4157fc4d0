//! Day-keyed archive of stand snapshots
//!
//! One entry per operational day, keyed `YYYY-MM-DD`. Routine writes
//! overwrite the day's entry; the reset path only creates it when absent.

use crate::models::state::AppState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyArchiveEntry {
    pub date: String,
    pub captured_at_ms: i64,
    pub snapshot: AppState,
}

/// All archived days, ordered by date
///
/// # Example
/// ```
/// use taxi_stand_core_rs::{AppState, DailyArchive};
///
/// let mut archive = DailyArchive::new();
/// archive.record("2026-03-01", 1_000, AppState::new());
/// assert!(!archive.record_if_absent("2026-03-01", 2_000, AppState::new()));
/// assert_eq!(archive.get("2026-03-01").unwrap().captured_at_ms, 1_000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyArchive {
    entries: BTreeMap<String, DailyArchiveEntry>,
}

impl DailyArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: &str) -> Option<&DailyArchiveEntry> {
        self.entries.get(date)
    }

    pub fn contains(&self, date: &str) -> bool {
        self.entries.contains_key(date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, DailyArchiveEntry> {
        &self.entries
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Entries whose date starts with `month` (`YYYY-MM`), oldest first
    pub fn month<'a>(&'a self, month: &'a str) -> impl Iterator<Item = &'a DailyArchiveEntry> + 'a {
        self.entries
            .values()
            .filter(move |entry| entry.date.starts_with(month))
    }

    /// Write `snapshot` under `date`, replacing any existing entry
    pub fn record(&mut self, date: &str, captured_at_ms: i64, snapshot: AppState) {
        self.entries.insert(
            date.to_string(),
            DailyArchiveEntry {
                date: date.to_string(),
                captured_at_ms,
                snapshot,
            },
        );
    }

    /// Write `snapshot` under `date` only if the day has no entry yet
    ///
    /// Returns true when an entry was created.
    pub fn record_if_absent(&mut self, date: &str, captured_at_ms: i64, snapshot: AppState) -> bool {
        if self.contains(date) {
            return false;
        }
        self.record(date, captured_at_ms, snapshot);
        true
    }

    /// Drop every entry dated strictly before `cutoff`
    ///
    /// Day keys are fixed-width `YYYY-MM-DD`, so string order is date order.
    pub fn prune_before(&mut self, cutoff: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|date, _| date.as_str() >= cutoff);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites() {
        let mut archive = DailyArchive::new();
        archive.record("2026-03-01", 1, AppState::new());
        archive.record("2026-03-01", 2, AppState::new());

        assert_eq!(archive.len(), 1);
        assert_eq!(archive.get("2026-03-01").unwrap().captured_at_ms, 2);
    }

    #[test]
    fn test_prune_before_keeps_cutoff_day() {
        let mut archive = DailyArchive::new();
        for date in ["2026-01-30", "2026-01-31", "2026-02-01", "2026-03-02"] {
            archive.record(date, 0, AppState::new());
        }

        assert_eq!(archive.prune_before("2026-01-31"), 1);
        assert_eq!(
            archive.dates().collect::<Vec<_>>(),
            vec!["2026-01-31", "2026-02-01", "2026-03-02"]
        );
    }

    #[test]
    fn test_month_filter() {
        let mut archive = DailyArchive::new();
        for date in ["2026-01-31", "2026-02-01", "2026-02-14"] {
            archive.record(date, 0, AppState::new());
        }
        assert_eq!(archive.month("2026-02").count(), 2);
    }

    #[test]
    fn test_wire_shape_is_a_date_map() {
        let mut archive = DailyArchive::new();
        archive.record("2026-03-01", 42, AppState::new());
        let value = serde_json::to_value(&archive).unwrap();

        assert_eq!(value["2026-03-01"]["date"], "2026-03-01");
        assert_eq!(value["2026-03-01"]["capturedAtMs"], 42);
        assert_eq!(value["2026-03-01"]["snapshot"]["cashTotal"], 0);
    }
}
