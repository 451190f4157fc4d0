//! Queue/ledger engine
//!
//! Every command is a pure transition `AppState × Command → AppState`. The
//! input state is never touched; on error the caller simply keeps it.
//!
//! ```text
//! add_mobile      unit created if unknown, appended to every lane it is missing from
//! assign_fare     fare appended, counts/total/cash bumped, streak cleared, unit to back of lane
//! defer_turn      streak bumped (restarts at threshold), unit to back of lane
//! remove_mobile   unit dropped from all lanes, stats retained
//! edit_fare       amount replaced, delta applied to unit total and cash
//! delete_fare     fare dropped, amount and lane count taken back
//! reset_day       empty state
//! ```

use crate::config::{ConfigError, StandConfig};
use crate::core::clock::OperationalTimezone;
use crate::engine::command::{validate_mobile_id, Command, CommandError};
use crate::models::fare::{FareRecord, QueueKind};
use crate::models::mobile::MobileUnit;
use crate::models::state::AppState;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Applies commands to stand states
///
/// # Example
/// ```
/// use chrono::Utc;
/// use taxi_stand_core_rs::{AppState, Command, Engine, QueueKind, StandConfig};
///
/// let engine = Engine::new(&StandConfig::default()).unwrap();
/// let now = Utc::now();
///
/// let state = engine
///     .apply(&AppState::new(), &Command::AddMobile { mobile_id: "101".into() }, now)
///     .unwrap();
/// let state = engine
///     .apply(
///         &state,
///         &Command::AssignFare { mobile_id: "101".into(), queue_kind: QueueKind::Local, amount: 2_500 },
///         now,
///     )
///     .unwrap();
///
/// assert_eq!(state.cash_total(), 2_500);
/// assert_eq!(state.unit("101").unwrap().counts().local, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    defer_threshold: u32,
    timezone: OperationalTimezone,
}

impl Engine {
    pub fn new(config: &StandConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            defer_threshold: config.defer_threshold,
            timezone: config.timezone()?,
        })
    }

    pub fn defer_threshold(&self) -> u32 {
        self.defer_threshold
    }

    pub fn timezone(&self) -> &OperationalTimezone {
        &self.timezone
    }

    /// Apply one command, stamping any new fare with `now`
    pub fn apply(
        &self,
        state: &AppState,
        command: &Command,
        now: DateTime<Utc>,
    ) -> Result<AppState, CommandError> {
        let result = match command {
            Command::AddMobile { mobile_id } => self.add_mobile(state, mobile_id),
            Command::AssignFare {
                mobile_id,
                queue_kind,
                amount,
            } => self.assign_fare(state, mobile_id, *queue_kind, *amount, now),
            Command::DeferTurn {
                mobile_id,
                queue_kind,
            } => self.defer_turn(state, mobile_id, *queue_kind),
            Command::RemoveMobile { mobile_id } => self.remove_mobile(state, mobile_id),
            Command::ToggleCorrectionMode => Ok(self.toggle_correction_mode(state)),
            Command::EditFare {
                mobile_id,
                fare_id,
                amount,
            } => self.edit_fare(state, mobile_id, fare_id, *amount),
            Command::DeleteFare { mobile_id, fare_id } => {
                self.delete_fare(state, mobile_id, fare_id)
            }
            Command::ResetDay => Ok(AppState::new()),
        };

        match &result {
            Ok(next) => debug!(
                command = command.name(),
                mobile_id = command.mobile_id().unwrap_or(""),
                cash_total = next.cash_total(),
                "command applied"
            ),
            Err(err) => warn!(
                command = command.name(),
                mobile_id = command.mobile_id().unwrap_or(""),
                error = %err,
                "command rejected"
            ),
        }

        result
    }

    pub fn add_mobile(&self, state: &AppState, mobile_id: &str) -> Result<AppState, CommandError> {
        let id = validate_mobile_id(mobile_id)?;
        let mut next = state.clone();

        if next.unit(&id).is_none() {
            next.insert_unit(MobileUnit::new(id.clone()));
        }
        for kind in QueueKind::ALL {
            next.queues_mut().push_back_if_absent(kind, &id);
        }
        if let Some(unit) = next.unit_mut(&id) {
            unit.set_active(true);
        }

        Ok(next)
    }

    pub fn assign_fare(
        &self,
        state: &AppState,
        mobile_id: &str,
        queue_kind: QueueKind,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<AppState, CommandError> {
        let id = validate_mobile_id(mobile_id)?;
        ensure_positive(amount)?;
        let unit = known_unit(state, &id)?;

        let unit_total = checked_total(unit.total_amount(), amount, &id)?;
        let cash_total = checked_total(state.cash_total(), amount, &id)?;

        let mut next = state.clone();
        let fare = FareRecord::new(queue_kind, amount, now, &self.timezone);
        if let Some(unit) = next.unit_mut(&id) {
            unit.record_fare(fare, unit_total);
        }
        next.set_cash_total(cash_total);
        next.queues_mut().move_to_back(queue_kind, &id);

        Ok(next)
    }

    pub fn defer_turn(
        &self,
        state: &AppState,
        mobile_id: &str,
        queue_kind: QueueKind,
    ) -> Result<AppState, CommandError> {
        let id = validate_mobile_id(mobile_id)?;
        known_unit(state, &id)?;

        let mut next = state.clone();
        if let Some(unit) = next.unit_mut(&id) {
            if unit.register_deferral(self.defer_threshold) {
                debug!(mobile_id = %id, kind = %queue_kind, "deferral streak completed");
            }
        }
        next.queues_mut().move_to_back(queue_kind, &id);

        Ok(next)
    }

    pub fn remove_mobile(&self, state: &AppState, mobile_id: &str) -> Result<AppState, CommandError> {
        let id = validate_mobile_id(mobile_id)?;
        known_unit(state, &id)?;

        let mut next = state.clone();
        next.queues_mut().remove_everywhere(&id);
        if let Some(unit) = next.unit_mut(&id) {
            unit.set_active(false);
        }

        Ok(next)
    }

    pub fn toggle_correction_mode(&self, state: &AppState) -> AppState {
        let mut next = state.clone();
        next.toggle_correction_mode();
        next
    }

    pub fn edit_fare(
        &self,
        state: &AppState,
        mobile_id: &str,
        fare_id: &str,
        amount: i64,
    ) -> Result<AppState, CommandError> {
        let id = validate_mobile_id(mobile_id)?;
        ensure_positive(amount)?;
        let unit = known_unit(state, &id)?;
        let index = fare_index(unit, &id, fare_id)?;

        let old_amount = unit.history()[index].amount();
        let out_of_range = || CommandError::AmountOutOfRange {
            mobile_id: id.clone(),
        };
        let delta = amount.checked_sub(old_amount).ok_or_else(out_of_range)?;
        let unit_total = unit.total_amount().checked_add(delta).ok_or_else(out_of_range)?;
        let cash_total = state.cash_total().checked_add(delta).ok_or_else(out_of_range)?;

        let mut next = state.clone();
        if let Some(unit) = next.unit_mut(&id) {
            unit.set_fare_amount(index, amount, unit_total);
        }
        next.set_cash_total(cash_total);

        Ok(next)
    }

    pub fn delete_fare(
        &self,
        state: &AppState,
        mobile_id: &str,
        fare_id: &str,
    ) -> Result<AppState, CommandError> {
        let id = validate_mobile_id(mobile_id)?;
        let unit = known_unit(state, &id)?;
        let index = fare_index(unit, &id, fare_id)?;

        let amount = unit.history()[index].amount();
        let cash_total = state
            .cash_total()
            .checked_sub(amount)
            .ok_or_else(|| CommandError::AmountOutOfRange {
                mobile_id: id.clone(),
            })?;

        let mut next = state.clone();
        if let Some(unit) = next.unit_mut(&id) {
            unit.remove_fare(index);
        }
        next.set_cash_total(cash_total);

        Ok(next)
    }
}

fn ensure_positive(amount: i64) -> Result<(), CommandError> {
    if amount <= 0 {
        return Err(CommandError::NonPositiveAmount(amount));
    }
    Ok(())
}

fn known_unit<'a>(state: &'a AppState, id: &str) -> Result<&'a MobileUnit, CommandError> {
    state
        .unit(id)
        .ok_or_else(|| CommandError::MobileNotFound(id.to_string()))
}

fn fare_index(unit: &MobileUnit, id: &str, fare_id: &str) -> Result<usize, CommandError> {
    unit.fare_index(fare_id)
        .ok_or_else(|| CommandError::FareNotFound {
            mobile_id: id.to_string(),
            fare_id: fare_id.to_string(),
        })
}

fn checked_total(total: i64, amount: i64, id: &str) -> Result<i64, CommandError> {
    total
        .checked_add(amount)
        .ok_or_else(|| CommandError::AmountOutOfRange {
            mobile_id: id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(&StandConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = StandConfig {
            defer_threshold: 0,
            ..StandConfig::default()
        };
        assert!(Engine::new(&config).is_err());
    }

    #[test]
    fn test_input_state_untouched_on_success() {
        let engine = engine();
        let before = AppState::new();
        let after = engine.add_mobile(&before, "3").unwrap();

        assert!(before.units().is_empty());
        assert_eq!(after.units().len(), 1);
    }

    #[test]
    fn test_overflowing_fare_rejected() {
        let engine = engine();
        let state = engine.add_mobile(&AppState::new(), "1").unwrap();
        let state = engine
            .assign_fare(&state, "1", QueueKind::Local, i64::MAX, Utc::now())
            .unwrap();

        let err = engine
            .assign_fare(&state, "1", QueueKind::Local, 1, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CommandError::AmountOutOfRange { .. }));
        assert_eq!(state.check_invariants(), Ok(()));
    }

    #[test]
    fn test_custom_defer_threshold() {
        let config = StandConfig {
            defer_threshold: 2,
            ..StandConfig::default()
        };
        let engine = Engine::new(&config).unwrap();
        let state = engine.add_mobile(&AppState::new(), "1").unwrap();
        let state = engine.defer_turn(&state, "1", QueueKind::Long).unwrap();
        assert_eq!(state.unit("1").unwrap().defer_count(), 1);
        let state = engine.defer_turn(&state, "1", QueueKind::Long).unwrap();
        assert_eq!(state.unit("1").unwrap().defer_count(), 0);
    }
}
