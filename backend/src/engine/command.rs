//! Commands accepted by the queue/ledger engine
//!
//! Commands are plain data so that collaborators can queue, log or ship them
//! (they serialize as `{"type": "assign_fare", ...}`).

use crate::models::fare::QueueKind;
use crate::models::mobile::is_mobile_id;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A mutating request against the stand state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Put a mobile at the back of all three lanes, creating it if unknown
    AddMobile { mobile_id: String },

    /// Record a completed fare and cycle the mobile to the back of its lane
    AssignFare {
        mobile_id: String,
        queue_kind: QueueKind,
        amount: i64, // Integer cents
    },

    /// Voluntary deferral ("cede"): the mobile gives up its turn in one lane
    DeferTurn {
        mobile_id: String,
        queue_kind: QueueKind,
    },

    /// Take a mobile out of every lane, keeping its stats and history
    RemoveMobile { mobile_id: String },

    /// Flip the presentation-only correction flag
    ToggleCorrectionMode,

    /// Replace the amount of a recorded fare
    EditFare {
        mobile_id: String,
        fare_id: String,
        amount: i64,
    },

    /// Remove a recorded fare from a mobile's history
    DeleteFare { mobile_id: String, fare_id: String },

    /// Start an empty day
    ResetDay,
}

impl Command {
    /// Short stable name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddMobile { .. } => "add_mobile",
            Command::AssignFare { .. } => "assign_fare",
            Command::DeferTurn { .. } => "defer_turn",
            Command::RemoveMobile { .. } => "remove_mobile",
            Command::ToggleCorrectionMode => "toggle_correction_mode",
            Command::EditFare { .. } => "edit_fare",
            Command::DeleteFare { .. } => "delete_fare",
            Command::ResetDay => "reset_day",
        }
    }

    /// Mobile the command targets, if any
    pub fn mobile_id(&self) -> Option<&str> {
        match self {
            Command::AddMobile { mobile_id }
            | Command::AssignFare { mobile_id, .. }
            | Command::DeferTurn { mobile_id, .. }
            | Command::RemoveMobile { mobile_id }
            | Command::EditFare { mobile_id, .. }
            | Command::DeleteFare { mobile_id, .. } => Some(mobile_id),
            Command::ToggleCorrectionMode | Command::ResetDay => None,
        }
    }
}

/// Broad class of a rejected command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; nothing was looked up
    Validation,
    /// Input was well-formed but names something absent from the state
    NotFound,
}

/// Why a command left the state unchanged
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Mobile ID '{0}' must be a non-empty string of digits")]
    InvalidMobileId(String),

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    #[error("Amount change for mobile {mobile_id} would overflow the ledger")]
    AmountOutOfRange { mobile_id: String },

    #[error("Mobile not found: {0}")]
    MobileNotFound(String),

    #[error("Fare {fare_id} not found for mobile {mobile_id}")]
    FareNotFound { mobile_id: String, fare_id: String },
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::InvalidMobileId(_)
            | CommandError::NonPositiveAmount(_)
            | CommandError::AmountOutOfRange { .. } => ErrorKind::Validation,
            CommandError::MobileNotFound(_) | CommandError::FareNotFound { .. } => {
                ErrorKind::NotFound
            }
        }
    }
}

/// Normalize and check a mobile ID
///
/// Surrounding whitespace is dropped; what remains must be ASCII digits.
///
/// # Example
/// ```
/// use taxi_stand_core_rs::engine::validate_mobile_id;
///
/// assert_eq!(validate_mobile_id(" 101 ").unwrap(), "101");
/// assert!(validate_mobile_id("10a").is_err());
/// assert!(validate_mobile_id("").is_err());
/// ```
pub fn validate_mobile_id(raw: &str) -> Result<String, CommandError> {
    let id = raw.trim();
    if !is_mobile_id(id) {
        return Err(CommandError::InvalidMobileId(raw.to_string()));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_shape() {
        let command = Command::AssignFare {
            mobile_id: "12".to_string(),
            queue_kind: QueueKind::Long,
            amount: 2_500,
        };
        let value = serde_json::to_value(&command).unwrap();

        assert_eq!(value["type"], "assign_fare");
        assert_eq!(value["queue_kind"], "long");

        let back: Command = serde_json::from_value(value).unwrap();
        assert_eq!(back, command);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CommandError::NonPositiveAmount(0).kind(), ErrorKind::Validation);
        assert_eq!(
            CommandError::MobileNotFound("1".to_string()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        assert!(validate_mobile_id("١٢").is_err());
        assert!(validate_mobile_id("-3").is_err());
        assert!(validate_mobile_id("1 2").is_err());
    }
}
