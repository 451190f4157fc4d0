//! The three dispatch lanes
//!
//! Each lane is an ordered list of mobile IDs; the front is the next unit to
//! be dispatched. A mobile appears at most once per lane.

use crate::models::fare::QueueKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    local: Vec<String>,
    medium: Vec<String>,
    long: Vec<String>,
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw lanes (for snapshot restoration)
    pub fn from_lanes(local: Vec<String>, medium: Vec<String>, long: Vec<String>) -> Self {
        Self { local, medium, long }
    }

    pub fn lane(&self, kind: QueueKind) -> &[String] {
        match kind {
            QueueKind::Local => &self.local,
            QueueKind::Medium => &self.medium,
            QueueKind::Long => &self.long,
        }
    }

    fn lane_mut(&mut self, kind: QueueKind) -> &mut Vec<String> {
        match kind {
            QueueKind::Local => &mut self.local,
            QueueKind::Medium => &mut self.medium,
            QueueKind::Long => &mut self.long,
        }
    }

    /// Next mobile to be dispatched from `kind`
    pub fn head(&self, kind: QueueKind) -> Option<&str> {
        self.lane(kind).first().map(String::as_str)
    }

    pub fn tail(&self, kind: QueueKind) -> Option<&str> {
        self.lane(kind).last().map(String::as_str)
    }

    pub fn position(&self, kind: QueueKind, mobile_id: &str) -> Option<usize> {
        self.lane(kind).iter().position(|id| id == mobile_id)
    }

    pub fn contains(&self, kind: QueueKind, mobile_id: &str) -> bool {
        self.position(kind, mobile_id).is_some()
    }

    pub fn is_queued_anywhere(&self, mobile_id: &str) -> bool {
        QueueKind::ALL
            .iter()
            .any(|&kind| self.contains(kind, mobile_id))
    }

    /// Append to the back of `kind` unless already present
    ///
    /// Returns true when the lane changed.
    pub(crate) fn push_back_if_absent(&mut self, kind: QueueKind, mobile_id: &str) -> bool {
        if self.contains(kind, mobile_id) {
            return false;
        }
        self.lane_mut(kind).push(mobile_id.to_string());
        true
    }

    /// Remove-then-append within `kind`; no-op when the mobile is not queued there
    pub(crate) fn move_to_back(&mut self, kind: QueueKind, mobile_id: &str) -> bool {
        match self.position(kind, mobile_id) {
            Some(index) => {
                let lane = self.lane_mut(kind);
                let id = lane.remove(index);
                lane.push(id);
                true
            }
            None => false,
        }
    }

    /// Drop `mobile_id` from every lane, keeping the order of the others
    pub(crate) fn remove_everywhere(&mut self, mobile_id: &str) -> bool {
        let mut changed = false;
        for kind in QueueKind::ALL {
            let lane = self.lane_mut(kind);
            let before = lane.len();
            lane.retain(|id| id != mobile_id);
            changed |= lane.len() != before;
        }
        changed
    }

    /// Every (lane, id) pair, lane by lane
    pub fn entries(&self) -> impl Iterator<Item = (QueueKind, &str)> + '_ {
        QueueKind::ALL
            .into_iter()
            .flat_map(move |kind| self.lane(kind).iter().map(move |id| (kind, id.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.medium.is_empty() && self.long.is_empty()
    }
}
