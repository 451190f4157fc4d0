//! Stand state
//!
//! The complete snapshot the engine transitions: the three lanes, every
//! mobile seen today, the running cash total and the correction-mode flag.
//!
//! # Critical Invariants
//!
//! 1. **Cash Consistency**: `cash_total == Σ unit.total_amount == Σ unit.history.amount`,
//!    with every sum fitting in i64 and every fare amount positive
//! 2. **Count Consistency**: `unit.counts[kind]` equals the fares of that kind in its history
//! 3. **Queue Validity**: every queued ID has a `MobileUnit` entry, and a unit is
//!    flagged active exactly when it holds a lane slot
//! 4. **Lane Uniqueness**: an ID appears at most once per lane
//! 5. **ID Format**: unit keys are digit strings

use crate::engine::snapshot::AppStateSnapshot;
use crate::models::fare::QueueKind;
use crate::models::mobile::{is_mobile_id, MobileUnit};
use crate::models::queues::QueueState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// A broken state invariant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Cash total {cash_total} does not match unit totals {units_total}")]
    CashMismatch { cash_total: i64, units_total: i64 },

    #[error("Mobile {mobile_id} total {total_amount} does not match its history sum {history_sum}")]
    HistoryMismatch {
        mobile_id: String,
        total_amount: i64,
        history_sum: i64,
    },

    #[error("Mobile {0} is queued but has no unit entry")]
    OrphanQueueEntry(String),

    #[error("Mobile {mobile_id} appears more than once in the {kind} lane")]
    DuplicateQueueEntry { mobile_id: String, kind: QueueKind },

    #[error("Unit keyed {key} carries id {id}")]
    KeyMismatch { key: String, id: String },

    #[error("Unit key '{0}' is not a digit string")]
    InvalidMobileId(String),

    #[error("Fare {fare_id} of mobile {mobile_id} has non-positive amount {amount}")]
    NonPositiveFare {
        mobile_id: String,
        fare_id: String,
        amount: i64,
    },

    #[error("Mobile {mobile_id} counts {count} {kind} fares but its history holds {fares}")]
    CountMismatch {
        mobile_id: String,
        kind: QueueKind,
        count: u32,
        fares: usize,
    },

    #[error("Amounts for {0} overflow i64")]
    AmountOverflow(String),

    #[error("Mobile {mobile_id} is flagged active={active_in_queues} but queued={queued}")]
    ActiveFlagMismatch {
        mobile_id: String,
        active_in_queues: bool,
        queued: bool,
    },
}

/// Complete stand state
///
/// Units are kept in a `BTreeMap` so serialization and digests are stable.
///
/// # Example
///
/// ```rust
/// use taxi_stand_core_rs::AppState;
///
/// let state = AppState::new();
/// assert_eq!(state.cash_total(), 0);
/// assert!(state.queues().is_empty());
/// assert!(state.check_invariants().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AppStateSnapshot", try_from = "AppStateSnapshot")]
pub struct AppState {
    queues: QueueState,
    units: BTreeMap<String, MobileUnit>,

    /// Running cash collected today (i64 cents)
    cash_total: i64,

    /// Presentation flag exposing fare edit/delete controls
    correction_mode_enabled: bool,
}

impl AppState {
    /// Empty state for a fresh day
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from parts without checking invariants
    ///
    /// Use [`AppState::check_invariants`] (or deserialize through the
    /// snapshot types, which does it for you) before trusting the result.
    pub fn from_parts(
        queues: QueueState,
        units: BTreeMap<String, MobileUnit>,
        cash_total: i64,
        correction_mode_enabled: bool,
    ) -> Self {
        Self {
            queues,
            units,
            cash_total,
            correction_mode_enabled,
        }
    }

    pub fn queues(&self) -> &QueueState {
        &self.queues
    }

    pub fn units(&self) -> &BTreeMap<String, MobileUnit> {
        &self.units
    }

    pub fn unit(&self, mobile_id: &str) -> Option<&MobileUnit> {
        self.units.get(mobile_id)
    }

    pub fn cash_total(&self) -> i64 {
        self.cash_total
    }

    pub fn correction_mode_enabled(&self) -> bool {
        self.correction_mode_enabled
    }

    /// Number of mobiles holding a slot in at least one lane
    pub fn active_units(&self) -> usize {
        self.units.values().filter(|u| u.active_in_queues()).count()
    }

    /// Σ unit.total_amount; `None` on i64 overflow
    pub fn units_total(&self) -> Option<i64> {
        self.units
            .values()
            .try_fold(0i64, |sum, unit| sum.checked_add(unit.total_amount()))
    }

    /// Σ unit.history.amount, recomputed from the fare records; `None` on i64 overflow
    pub fn history_total(&self) -> Option<i64> {
        self.units
            .values()
            .try_fold(0i64, |sum, unit| sum.checked_add(unit.history_sum()?))
    }

    pub(crate) fn queues_mut(&mut self) -> &mut QueueState {
        &mut self.queues
    }

    pub(crate) fn unit_mut(&mut self, mobile_id: &str) -> Option<&mut MobileUnit> {
        self.units.get_mut(mobile_id)
    }

    pub(crate) fn insert_unit(&mut self, unit: MobileUnit) {
        self.units.insert(unit.id().to_string(), unit);
    }

    pub(crate) fn set_cash_total(&mut self, cash_total: i64) {
        self.cash_total = cash_total;
    }

    pub(crate) fn toggle_correction_mode(&mut self) {
        self.correction_mode_enabled = !self.correction_mode_enabled;
    }

    /// Verify the cash, count and queue invariants
    ///
    /// Snapshots from the archive or the remote mirror pass through here
    /// before they become state.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (key, unit) in &self.units {
            if key != unit.id() {
                return Err(InvariantViolation::KeyMismatch {
                    key: key.clone(),
                    id: unit.id().to_string(),
                });
            }
            if !is_mobile_id(key) {
                return Err(InvariantViolation::InvalidMobileId(key.clone()));
            }
            check_unit(unit)?;
        }

        let units_total = self
            .units_total()
            .ok_or_else(|| InvariantViolation::AmountOverflow("cash total".to_string()))?;
        if units_total != self.cash_total {
            return Err(InvariantViolation::CashMismatch {
                cash_total: self.cash_total,
                units_total,
            });
        }

        for kind in QueueKind::ALL {
            let mut seen = HashSet::new();
            for id in self.queues.lane(kind) {
                if !self.units.contains_key(id) {
                    return Err(InvariantViolation::OrphanQueueEntry(id.clone()));
                }
                if !seen.insert(id.as_str()) {
                    return Err(InvariantViolation::DuplicateQueueEntry {
                        mobile_id: id.clone(),
                        kind,
                    });
                }
            }
        }

        for unit in self.units.values() {
            let queued = self.queues.is_queued_anywhere(unit.id());
            if unit.active_in_queues() != queued {
                return Err(InvariantViolation::ActiveFlagMismatch {
                    mobile_id: unit.id().to_string(),
                    active_in_queues: unit.active_in_queues(),
                    queued,
                });
            }
        }

        Ok(())
    }
}

/// Per-unit ledger checks: positive fares, matching counts, matching total
fn check_unit(unit: &MobileUnit) -> Result<(), InvariantViolation> {
    if let Some(fare) = unit.history().iter().find(|fare| fare.amount() <= 0) {
        return Err(InvariantViolation::NonPositiveFare {
            mobile_id: unit.id().to_string(),
            fare_id: fare.id().to_string(),
            amount: fare.amount(),
        });
    }

    for kind in QueueKind::ALL {
        let count = unit.counts().get(kind);
        let fares = unit.fares_in(kind);
        if usize::try_from(count).map_or(true, |count| count != fares) {
            return Err(InvariantViolation::CountMismatch {
                mobile_id: unit.id().to_string(),
                kind,
                count,
                fares,
            });
        }
    }

    let history_sum = unit
        .history_sum()
        .ok_or_else(|| InvariantViolation::AmountOverflow(format!("mobile {}", unit.id())))?;
    if history_sum != unit.total_amount() {
        return Err(InvariantViolation::HistoryMismatch {
            mobile_id: unit.id().to_string(),
            total_amount: unit.total_amount(),
            history_sum,
        });
    }

    Ok(())
}
