//! Mobile (vehicle unit) model
//!
//! A mobile is tracked by a numeric ID string. Its statistics and fare
//! history survive removal from the queues for the rest of the day, so a
//! removed unit can still be corrected and re-added later.
//!
//! CRITICAL: `total_amount` must always equal the sum of `history` amounts.

use crate::models::fare::{FareRecord, QueueKind};

/// Fare counts per lane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounts {
    pub local: u32,
    pub medium: u32,
    pub long: u32,
}

impl QueueCounts {
    pub fn get(&self, kind: QueueKind) -> u32 {
        match kind {
            QueueKind::Local => self.local,
            QueueKind::Medium => self.medium,
            QueueKind::Long => self.long,
        }
    }

    fn slot_mut(&mut self, kind: QueueKind) -> &mut u32 {
        match kind {
            QueueKind::Local => &mut self.local,
            QueueKind::Medium => &mut self.medium,
            QueueKind::Long => &mut self.long,
        }
    }

    pub(crate) fn increment(&mut self, kind: QueueKind) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(1);
    }

    pub(crate) fn decrement(&mut self, kind: QueueKind) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_sub(1);
    }

    /// Fares across all lanes
    pub fn total(&self) -> u32 {
        self.local
            .saturating_add(self.medium)
            .saturating_add(self.long)
    }
}

/// Whether `id` is a well-formed mobile ID: one or more ASCII digits
pub fn is_mobile_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// A vehicle unit working the stand
///
/// # Example
/// ```
/// use taxi_stand_core_rs::MobileUnit;
///
/// let unit = MobileUnit::new("101".to_string());
/// assert_eq!(unit.id(), "101");
/// assert_eq!(unit.total_amount(), 0);
/// assert!(unit.history().is_empty());
/// assert!(unit.active_in_queues());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileUnit {
    id: String,
    counts: QueueCounts,

    /// Running sum of history amounts (i64 cents)
    total_amount: i64,

    /// Fares in insertion (chronological) order
    history: Vec<FareRecord>,

    /// Consecutive deferrals since the last fare or streak reset
    defer_count: u32,

    /// Whether the unit currently holds a slot in any lane
    active_in_queues: bool,
}

impl MobileUnit {
    /// New unit with zero statistics, entering the queues
    pub fn new(id: String) -> Self {
        Self {
            id,
            counts: QueueCounts::default(),
            total_amount: 0,
            history: Vec::new(),
            defer_count: 0,
            active_in_queues: true,
        }
    }

    /// Rebuild a unit from persisted fields (for snapshot restoration)
    pub fn from_snapshot(
        id: String,
        counts: QueueCounts,
        total_amount: i64,
        history: Vec<FareRecord>,
        defer_count: u32,
        active_in_queues: bool,
    ) -> Self {
        Self {
            id,
            counts,
            total_amount,
            history,
            defer_count,
            active_in_queues,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn counts(&self) -> QueueCounts {
        self.counts
    }

    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    pub fn history(&self) -> &[FareRecord] {
        &self.history
    }

    pub fn defer_count(&self) -> u32 {
        self.defer_count
    }

    pub fn active_in_queues(&self) -> bool {
        self.active_in_queues
    }

    pub fn find_fare(&self, fare_id: &str) -> Option<&FareRecord> {
        self.history.iter().find(|fare| fare.id() == fare_id)
    }

    /// Sum of amounts in `history`, recomputed; `None` on i64 overflow
    pub fn history_sum(&self) -> Option<i64> {
        self.history
            .iter()
            .try_fold(0i64, |sum, fare| sum.checked_add(fare.amount()))
    }

    /// Number of fares in `history` dispatched from `kind`
    pub fn fares_in(&self, kind: QueueKind) -> usize {
        self.history
            .iter()
            .filter(|fare| fare.queue_kind() == kind)
            .count()
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active_in_queues = active;
    }

    /// Append a fare; the caller has already checked `total_amount` won't overflow
    pub(crate) fn record_fare(&mut self, fare: FareRecord, new_total: i64) {
        self.counts.increment(fare.queue_kind());
        self.total_amount = new_total;
        self.defer_count = 0;
        self.history.push(fare);
    }

    pub(crate) fn set_fare_amount(&mut self, index: usize, amount: i64, new_total: i64) {
        if let Some(fare) = self.history.get_mut(index) {
            fare.set_amount(amount);
            self.total_amount = new_total;
        }
    }

    pub(crate) fn remove_fare(&mut self, index: usize) -> Option<FareRecord> {
        if index >= self.history.len() {
            return None;
        }
        let fare = self.history.remove(index);
        self.counts.decrement(fare.queue_kind());
        self.total_amount -= fare.amount();
        Some(fare)
    }

    pub(crate) fn fare_index(&self, fare_id: &str) -> Option<usize> {
        self.history.iter().position(|fare| fare.id() == fare_id)
    }

    /// Count one deferral, restarting the streak once it reaches `threshold`
    ///
    /// Returns true when the threshold was hit on this call.
    pub(crate) fn register_deferral(&mut self, threshold: u32) -> bool {
        self.defer_count = self.defer_count.saturating_add(1);
        if self.defer_count >= threshold {
            self.defer_count = 0;
            true
        } else {
            false
        }
    }
}
