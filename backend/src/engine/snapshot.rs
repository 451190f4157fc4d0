//! Snapshot - the persisted/exchanged wire shape of [`AppState`]
//!
//! This is the only format shared with the collaborators (device archive,
//! remote mirror, report renderers). It must round-trip exactly.
//!
//! ```text
//! AppState:
//!   queues: { local: [id], medium: [id], long: [id] }
//!   units: { [id]: { id, countsLocal, countsMedium, countsLong,
//!                    totalAmount, history: [FareRecord], deferCount, activeInQueues } }
//!   cashTotal: int (cents)
//!   correctionModeEnabled: bool
//! ```
//!
//! # Critical Invariants
//!
//! - **Cash Consistency**: checked on every deserialization
//! - **Queue Integrity**: no orphaned or duplicate lane entries

use crate::models::fare::FareRecord;
use crate::models::mobile::{MobileUnit, QueueCounts};
use crate::models::queues::QueueState;
use crate::models::state::{AppState, InvariantViolation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot violates state invariants: {0}")]
    Invalid(#[from] InvariantViolation),
}

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete stand state on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStateSnapshot {
    pub queues: QueueState,
    pub units: BTreeMap<String, MobileUnitSnapshot>,
    pub cash_total: i64,
    pub correction_mode_enabled: bool,
}

/// Mobile unit on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileUnitSnapshot {
    pub id: String,
    pub counts_local: u32,
    pub counts_medium: u32,
    pub counts_long: u32,
    pub total_amount: i64,
    pub history: Vec<FareRecord>,
    pub defer_count: u32,
    pub active_in_queues: bool,
}

impl From<&MobileUnit> for MobileUnitSnapshot {
    fn from(unit: &MobileUnit) -> Self {
        let counts = unit.counts();
        MobileUnitSnapshot {
            id: unit.id().to_string(),
            counts_local: counts.local,
            counts_medium: counts.medium,
            counts_long: counts.long,
            total_amount: unit.total_amount(),
            history: unit.history().to_vec(),
            defer_count: unit.defer_count(),
            active_in_queues: unit.active_in_queues(),
        }
    }
}

impl From<MobileUnitSnapshot> for MobileUnit {
    fn from(snapshot: MobileUnitSnapshot) -> Self {
        MobileUnit::from_snapshot(
            snapshot.id,
            QueueCounts {
                local: snapshot.counts_local,
                medium: snapshot.counts_medium,
                long: snapshot.counts_long,
            },
            snapshot.total_amount,
            snapshot.history,
            snapshot.defer_count,
            snapshot.active_in_queues,
        )
    }
}

impl From<&AppState> for AppStateSnapshot {
    fn from(state: &AppState) -> Self {
        AppStateSnapshot {
            queues: state.queues().clone(),
            units: state
                .units()
                .iter()
                .map(|(id, unit)| (id.clone(), MobileUnitSnapshot::from(unit)))
                .collect(),
            cash_total: state.cash_total(),
            correction_mode_enabled: state.correction_mode_enabled(),
        }
    }
}

impl From<AppState> for AppStateSnapshot {
    fn from(state: AppState) -> Self {
        AppStateSnapshot::from(&state)
    }
}

impl TryFrom<AppStateSnapshot> for AppState {
    type Error = InvariantViolation;

    fn try_from(snapshot: AppStateSnapshot) -> Result<Self, Self::Error> {
        let units = snapshot
            .units
            .into_iter()
            .map(|(id, unit)| (id, MobileUnit::from(unit)))
            .collect();
        let state = AppState::from_parts(
            snapshot.queues,
            units,
            snapshot.cash_total,
            snapshot.correction_mode_enabled,
        );
        state.check_invariants()?;
        Ok(state)
    }
}

// ============================================================================
// JSON helpers
// ============================================================================

pub fn to_json(state: &AppState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&AppStateSnapshot::from(state))?)
}

/// Parse and validate a snapshot document
pub fn from_json(json: &str) -> Result<AppState, SnapshotError> {
    let snapshot: AppStateSnapshot = serde_json::from_str(json)?;
    Ok(AppState::try_from(snapshot)?)
}

// ============================================================================
// Digests
// ============================================================================

/// Deterministic SHA-256 of any serializable value
///
/// Object keys are sorted recursively before hashing, so two values that
/// serialize to the same JSON modulo key order share a digest.
pub fn compute_digest<T: Serialize>(value: &T) -> Result<String, SnapshotError> {
    use serde_json::Value;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = canonicalize(serde_json::to_value(value)?);
    let json = serde_json::to_string(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest of a stand state, used to tell whether two snapshots disagree
pub fn snapshot_digest(state: &AppState) -> Result<String, SnapshotError> {
    compute_digest(&AppStateSnapshot::from(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_wire_shape() {
        let json = to_json(&AppState::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["queues"]["local"], serde_json::json!([]));
        assert_eq!(value["units"], serde_json::json!({}));
        assert_eq!(value["cashTotal"], 0);
        assert_eq!(value["correctionModeEnabled"], false);
    }

    #[test]
    fn test_digest_ignores_key_order() {
        let a: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":[{"y":2,"x":1}]}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"b":[{"x":1,"y":2}],"a":1}"#).unwrap();

        assert_eq!(compute_digest(&a).unwrap(), compute_digest(&b).unwrap());
    }

    #[test]
    fn test_cash_mismatch_rejected_on_load() {
        let json = r#"{
            "queues": { "local": [], "medium": [], "long": [] },
            "units": {},
            "cashTotal": 500,
            "correctionModeEnabled": false
        }"#;

        assert!(matches!(
            from_json(json),
            Err(SnapshotError::Invalid(InvariantViolation::CashMismatch { .. }))
        ));
    }
}
