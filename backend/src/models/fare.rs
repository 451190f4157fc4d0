//! Fare model
//!
//! A fare is one completed, paid trip attributed to a mobile and to the
//! queue lane it was dispatched from.
//!
//! CRITICAL: All money values are i64 (cents)

use crate::core::clock::OperationalTimezone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three priority lanes of the stand
///
/// Wire tokens are `local`, `medium` and `long`. The historical lane names
/// (`blanca`, `azul`, `roja`) are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    #[serde(alias = "blanca")]
    Local,
    #[serde(alias = "azul")]
    Medium,
    #[serde(alias = "roja")]
    Long,
}

impl QueueKind {
    /// All lanes, in display order
    pub const ALL: [QueueKind; 3] = [QueueKind::Local, QueueKind::Medium, QueueKind::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueKind::Local => "local",
            QueueKind::Medium => "medium",
            QueueKind::Long => "long",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown queue kind '{0}'")]
pub struct ParseQueueKindError(pub String);

impl FromStr for QueueKind {
    type Err = ParseQueueKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" | "blanca" => Ok(QueueKind::Local),
            "medium" | "azul" => Ok(QueueKind::Medium),
            "long" | "roja" => Ok(QueueKind::Long),
            other => Err(ParseQueueKindError(other.to_string())),
        }
    }
}

/// One completed trip
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use taxi_stand_core_rs::{FareRecord, OperationalTimezone, QueueKind};
///
/// let at = Utc.with_ymd_and_hms(2026, 4, 2, 15, 4, 5).unwrap();
/// let fare = FareRecord::new(QueueKind::Long, 4_500, at, &OperationalTimezone::chile());
///
/// assert_eq!(fare.amount(), 4_500);
/// assert_eq!(fare.time_label(), "12:04:05");
/// assert_eq!(fare.timestamp_ms(), at.timestamp_millis());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareRecord {
    /// Time-ordered unique identifier (UUID v7)
    id: String,

    /// Lane the fare was dispatched from
    queue_kind: QueueKind,

    /// Fare amount (i64 cents)
    amount: i64,

    /// `HH:MM:SS` in the operational timezone
    time_label: String,

    /// Milliseconds since the Unix epoch, for ordering
    timestamp_ms: i64,
}

impl FareRecord {
    /// Create a fare recorded at `at`
    ///
    /// The caller is responsible for checking that `amount` is positive.
    pub fn new(
        queue_kind: QueueKind,
        amount: i64,
        at: DateTime<Utc>,
        timezone: &OperationalTimezone,
    ) -> Self {
        Self {
            id: fare_id_at(at),
            queue_kind,
            amount,
            time_label: timezone.time_label(at),
            timestamp_ms: at.timestamp_millis(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn queue_kind(&self) -> QueueKind {
        self.queue_kind
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn time_label(&self) -> &str {
        &self.time_label
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub(crate) fn set_amount(&mut self, amount: i64) {
        self.amount = amount;
    }
}

fn fare_id_at(at: DateTime<Utc>) -> String {
    let seconds = u64::try_from(at.timestamp()).unwrap_or(0);
    let timestamp = uuid::Timestamp::from_unix(uuid::NoContext, seconds, at.timestamp_subsec_nanos());
    uuid::Uuid::new_v7(timestamp).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_legacy_lane_tokens() {
        let kinds: Vec<QueueKind> = serde_json::from_str(r#"["blanca","azul","roja"]"#).unwrap();
        assert_eq!(kinds, QueueKind::ALL.to_vec());
        assert_eq!("roja".parse::<QueueKind>(), Ok(QueueKind::Long));
        assert!("verde".parse::<QueueKind>().is_err());
    }

    #[test]
    fn test_serializes_canonical_token() {
        let json = serde_json::to_string(&QueueKind::Medium).unwrap();
        assert_eq!(json, r#""medium""#);
    }

    #[test]
    fn test_fare_ids_unique_and_time_ordered() {
        let tz = OperationalTimezone::chile();
        let t0 = Utc.with_ymd_and_hms(2026, 4, 2, 15, 0, 0).unwrap();
        let a = FareRecord::new(QueueKind::Local, 100, t0, &tz);
        let b = FareRecord::new(QueueKind::Local, 100, t0, &tz);
        let c = FareRecord::new(QueueKind::Local, 100, t0 + chrono::Duration::seconds(1), &tz);

        assert_ne!(a.id(), b.id());
        assert!(a.id() < c.id());
        assert!(b.id() < c.id());
    }

    #[test]
    fn test_wire_field_names() {
        let tz = OperationalTimezone::chile();
        let at = Utc.with_ymd_and_hms(2026, 4, 2, 15, 0, 0).unwrap();
        let fare = FareRecord::new(QueueKind::Local, 100, at, &tz);
        let value = serde_json::to_value(&fare).unwrap();

        assert_eq!(value["queueKind"], "local");
        assert_eq!(value["timeLabel"], "12:00:00");
        assert_eq!(value["timestampMs"], at.timestamp_millis());
    }
}
