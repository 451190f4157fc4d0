//! Statistics over stand snapshots
//!
//! Daily figures come from one [`AppState`]; monthly figures aggregate the
//! archived days of a calendar month.
//!
//! CRITICAL: All money values are i64 (cents)

use crate::models::fare::QueueKind;
use crate::models::mobile::{MobileUnit, QueueCounts};
use crate::models::state::AppState;
use crate::rollover::archive::DailyArchive;
use serde::Serialize;
use std::cmp::Ordering;

/// One mobile's line in the daily table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileRow {
    pub mobile_id: String,
    pub counts_local: u32,
    pub counts_medium: u32,
    pub counts_long: u32,
    pub total_fares: u32,
    pub total_amount: i64,
    pub active_in_queues: bool,
}

impl From<&MobileUnit> for MobileRow {
    fn from(unit: &MobileUnit) -> Self {
        let counts = unit.counts();
        MobileRow {
            mobile_id: unit.id().to_string(),
            counts_local: counts.local,
            counts_medium: counts.medium,
            counts_long: counts.long,
            total_fares: counts.total(),
            total_amount: unit.total_amount(),
            active_in_queues: unit.active_in_queues(),
        }
    }
}

/// Per-lane totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneTotals {
    pub fares: u32,
    pub amount: i64,
}

/// Summary of one day
///
/// # Example
/// ```
/// use taxi_stand_core_rs::{AppState, DailyStatistics};
///
/// let stats = DailyStatistics::from_state("2026-03-10", &AppState::new());
/// assert_eq!(stats.total_fares, 0);
/// assert!(stats.rows.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatistics {
    pub date: String,
    pub rows: Vec<MobileRow>,
    pub local: LaneTotals,
    pub medium: LaneTotals,
    pub long: LaneTotals,
    pub total_fares: u32,
    pub cash_total: i64,
    pub tracked_mobiles: usize,
    pub active_mobiles: usize,
}

impl DailyStatistics {
    pub fn from_state(date: &str, state: &AppState) -> Self {
        let mut rows: Vec<MobileRow> = state.units().values().map(MobileRow::from).collect();
        rows.sort_by(|a, b| compare_mobile_ids(&a.mobile_id, &b.mobile_id));

        let mut counts = QueueCounts::default();
        let mut amounts = [0i64; 3];
        for unit in state.units().values() {
            let unit_counts = unit.counts();
            counts.local += unit_counts.local;
            counts.medium += unit_counts.medium;
            counts.long += unit_counts.long;
            for fare in unit.history() {
                amounts[lane_index(fare.queue_kind())] += fare.amount();
            }
        }

        let lane = |kind: QueueKind| LaneTotals {
            fares: counts.get(kind),
            amount: amounts[lane_index(kind)],
        };

        DailyStatistics {
            date: date.to_string(),
            local: lane(QueueKind::Local),
            medium: lane(QueueKind::Medium),
            long: lane(QueueKind::Long),
            total_fares: counts.total(),
            cash_total: state.cash_total(),
            tracked_mobiles: rows.len(),
            active_mobiles: state.active_units(),
            rows,
        }
    }

    pub fn lane(&self, kind: QueueKind) -> LaneTotals {
        match kind {
            QueueKind::Local => self.local,
            QueueKind::Medium => self.medium,
            QueueKind::Long => self.long,
        }
    }
}

fn lane_index(kind: QueueKind) -> usize {
    match kind {
        QueueKind::Local => 0,
        QueueKind::Medium => 1,
        QueueKind::Long => 2,
    }
}

/// Numeric order for digit IDs, falling back to text order
fn compare_mobile_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// One archived day inside a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: String,
    pub cash_total: i64,
    pub total_fares: u32,
}

/// Aggregate of the archived days in one `YYYY-MM` month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: String,
    /// Newest first
    pub days: Vec<DaySummary>,
    pub cash_total: i64,
    pub total_fares: u32,
    pub days_worked: usize,
    /// Cash per worked day, truncated to whole cents
    pub average_per_day: i64,
}

impl MonthlySummary {
    pub fn from_archive(archive: &DailyArchive, month: &str) -> Self {
        let mut days: Vec<DaySummary> = archive
            .month(month)
            .map(|entry| DaySummary {
                date: entry.date.clone(),
                cash_total: entry.snapshot.cash_total(),
                total_fares: entry
                    .snapshot
                    .units()
                    .values()
                    .fold(0u32, |sum, unit| sum.saturating_add(unit.counts().total())),
            })
            .collect();
        days.sort_by(|a, b| b.date.cmp(&a.date));

        let cash_total = days
            .iter()
            .fold(0i64, |sum, d| sum.saturating_add(d.cash_total));
        let total_fares = days
            .iter()
            .fold(0u32, |sum, d| sum.saturating_add(d.total_fares));
        let days_worked = days.len();
        let average_per_day = match i64::try_from(days_worked) {
            Ok(n) if n > 0 => cash_total / n,
            _ => 0,
        };

        MonthlySummary {
            month: month.to_string(),
            days,
            cash_total,
            total_fares,
            days_worked,
            average_per_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_order() {
        let mut ids = vec!["10", "9", "100", "09"];
        ids.sort_by(|a, b| compare_mobile_ids(a, b));
        assert_eq!(ids, vec!["09", "9", "10", "100"]);
    }

    #[test]
    fn test_empty_month() {
        let summary = MonthlySummary::from_archive(&DailyArchive::new(), "2026-03");
        assert_eq!(summary.days_worked, 0);
        assert_eq!(summary.average_per_day, 0);
    }
}
