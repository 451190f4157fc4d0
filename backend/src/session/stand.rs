//! Stand session
//!
//! The imperative shell around the pure engine. A `Stand` owns the current
//! state, today's day key and the archive. After every applied command it
//! writes the snapshot to the archive under today's key.
//!
//! Commands take `&mut self`, so one stand serializes its writers. To share
//! a stand between threads, put it behind a `Mutex` and hold the lock across
//! the whole command, so each transition and its archive write happen as a unit.

use crate::config::{ConfigError, StandConfig};
use crate::core::clock::Clock;
use crate::engine::command::{Command, CommandError};
use crate::engine::snapshot::{snapshot_digest, SnapshotError};
use crate::engine::transition::Engine;
use crate::models::fare::QueueKind;
use crate::models::state::AppState;
use crate::rollover::archive::{DailyArchive, DailyArchiveEntry};
use crate::rollover::policy::{start_day, RolloverDecision};
use crate::session::mirror::{RefreshOutcome, RemoteMirror};
use crate::session::store::{ArchiveStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StandError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Archive store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
}

/// A running dispatch stand
///
/// # Example
/// ```
/// use taxi_stand_core_rs::{MemoryStore, QueueKind, Stand, StandConfig, SystemClock};
///
/// let mut stand = Stand::open(MemoryStore::new(), SystemClock, StandConfig::default()).unwrap();
/// stand.add_mobile("101").unwrap();
/// stand.add_mobile("202").unwrap();
/// stand.assign_fare("101", QueueKind::Local, 2_500).unwrap();
///
/// assert_eq!(stand.state().queues().head(QueueKind::Local), Some("202"));
/// assert_eq!(stand.archive(None).unwrap().snapshot.cash_total(), 2_500);
/// ```
pub struct Stand<S: ArchiveStore, C: Clock> {
    engine: Engine,
    retention_days: u32,
    store: S,
    clock: C,
    state: AppState,
    archive: DailyArchive,
    today: String,
}

impl<S: ArchiveStore, C: Clock> Stand<S, C> {
    /// Load the archive and run the day rollover policy
    pub fn open(mut store: S, clock: C, config: StandConfig) -> Result<Self, StandError> {
        let engine = Engine::new(&config)?;
        let mut archive = store.load_archive()?;
        let last_known_date = store.load_current_date()?;

        let today = engine.timezone().day_key(clock.now());
        let start = start_day(
            last_known_date.as_deref(),
            &today,
            &mut archive,
            config.retention_days,
        );

        if let RolloverDecision::NewDay { pruned, .. } = start.decision {
            if pruned > 0 {
                store.save_archive(&archive)?;
            }
        }
        store.save_current_date(&today)?;

        Ok(Self {
            engine,
            retention_days: config.retention_days,
            store,
            clock,
            state: start.state,
            archive,
            today,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Operational day this session writes to
    pub fn today(&self) -> &str {
        &self.today
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Archived entry for `date`, or for today when `date` is `None`
    pub fn archive(&self, date: Option<&str>) -> Option<&DailyArchiveEntry> {
        self.archive.get(date.unwrap_or(self.today.as_str()))
    }

    /// The full archive map
    pub fn archive_all(&self) -> &DailyArchive {
        &self.archive
    }

    pub fn digest(&self) -> Result<String, SnapshotError> {
        snapshot_digest(&self.state)
    }

    /// Apply a command and archive the resulting state
    ///
    /// A rejected command leaves state and archive untouched. If the store
    /// write fails the in-memory state has still advanced; the next
    /// successful write persists the full snapshot.
    pub fn execute(&mut self, command: Command) -> Result<(), StandError> {
        if matches!(command, Command::ResetDay) {
            return self.reset_day().map(|_| ());
        }

        let now = self.clock.now();
        self.state = self.engine.apply(&self.state, &command, now)?;
        self.archive
            .record(&self.today, now.timestamp_millis(), self.state.clone());
        self.store.save_archive(&self.archive)?;
        Ok(())
    }

    pub fn add_mobile(&mut self, mobile_id: &str) -> Result<(), StandError> {
        self.execute(Command::AddMobile {
            mobile_id: mobile_id.to_string(),
        })
    }

    pub fn assign_fare(
        &mut self,
        mobile_id: &str,
        queue_kind: QueueKind,
        amount: i64,
    ) -> Result<(), StandError> {
        self.execute(Command::AssignFare {
            mobile_id: mobile_id.to_string(),
            queue_kind,
            amount,
        })
    }

    pub fn defer_turn(&mut self, mobile_id: &str, queue_kind: QueueKind) -> Result<(), StandError> {
        self.execute(Command::DeferTurn {
            mobile_id: mobile_id.to_string(),
            queue_kind,
        })
    }

    pub fn remove_mobile(&mut self, mobile_id: &str) -> Result<(), StandError> {
        self.execute(Command::RemoveMobile {
            mobile_id: mobile_id.to_string(),
        })
    }

    pub fn toggle_correction_mode(&mut self) -> Result<(), StandError> {
        self.execute(Command::ToggleCorrectionMode)
    }

    pub fn edit_fare(&mut self, mobile_id: &str, fare_id: &str, amount: i64) -> Result<(), StandError> {
        self.execute(Command::EditFare {
            mobile_id: mobile_id.to_string(),
            fare_id: fare_id.to_string(),
            amount,
        })
    }

    pub fn delete_fare(&mut self, mobile_id: &str, fare_id: &str) -> Result<(), StandError> {
        self.execute(Command::DeleteFare {
            mobile_id: mobile_id.to_string(),
            fare_id: fare_id.to_string(),
        })
    }

    /// Archive the current state (only if today has no entry yet), then start empty
    ///
    /// Returns true when this call created today's archive entry. The empty
    /// state is not written over that entry, so reopening the stand later the
    /// same day resumes the archived pre-reset state. The first command after
    /// the reset overwrites the entry as usual.
    pub fn reset_day(&mut self) -> Result<bool, StandError> {
        let now = self.clock.now();
        let archived =
            self.archive
                .record_if_absent(&self.today, now.timestamp_millis(), self.state.clone());
        if archived {
            self.store.save_archive(&self.archive)?;
        }

        self.state = self.engine.apply(&self.state, &Command::ResetDay, now)?;
        info!(today = %self.today, archived, "day reset");
        Ok(archived)
    }

    /// Re-run the rollover policy if the operational day changed mid-session
    ///
    /// Returns true when a new day was started.
    pub fn roll_over_if_needed(&mut self) -> Result<bool, StandError> {
        let today = self.engine.timezone().day_key(self.clock.now());
        if today == self.today {
            return Ok(false);
        }

        let start = start_day(
            Some(self.today.as_str()),
            &today,
            &mut self.archive,
            self.retention_days,
        );
        self.store.save_archive(&self.archive)?;
        self.store.save_current_date(&today)?;
        self.state = start.state;
        self.today = today;
        Ok(true)
    }

    /// Best-effort push of today's snapshot; failures are logged, never raised
    pub fn push_to_mirror<M: RemoteMirror>(&self, mirror: &mut M) -> bool {
        match mirror.push(&self.today, &self.state) {
            Ok(()) => true,
            Err(err) => {
                warn!(today = %self.today, error = %err, "mirror push failed");
                false
            }
        }
    }

    /// Pull today's remote snapshot and adopt it wholesale if it differs
    pub fn refresh_from_mirror<M: RemoteMirror>(&mut self, mirror: &mut M) -> RefreshOutcome {
        let remote = match mirror.pull(&self.today) {
            Ok(Some(remote)) => remote,
            Ok(None) => return RefreshOutcome::NoRemoteData,
            Err(err) => {
                warn!(today = %self.today, error = %err, "mirror pull failed");
                return RefreshOutcome::Failed;
            }
        };

        let same = match (snapshot_digest(&remote), snapshot_digest(&self.state)) {
            (Ok(remote_digest), Ok(local_digest)) => remote_digest == local_digest,
            _ => remote == self.state,
        };
        if same {
            return RefreshOutcome::Unchanged;
        }

        info!(today = %self.today, "adopting remote snapshot");
        self.state = remote;
        let now = self.clock.now();
        self.archive
            .record(&self.today, now.timestamp_millis(), self.state.clone());
        if let Err(err) = self.store.save_archive(&self.archive) {
            warn!(today = %self.today, error = %err, "archive write after refresh failed");
        }
        RefreshOutcome::Replaced
    }
}
