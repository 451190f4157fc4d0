//! PyO3 wrapper for the stand session
//!
//! # Example (from Python)
//!
//! ```python
//! from taxi_stand_core_rs import TaxiStand
//!
//! stand = TaxiStand('{"retention_days": 30}')
//! stand.add_mobile("101")
//! stand.assign_fare("101", "local", 2500)
//! print(stand.snapshot_json())
//! ```

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::StandConfig;
use crate::core::clock::SystemClock;
use crate::engine::command::{CommandError, ErrorKind};
use crate::engine::snapshot;
use crate::models::fare::QueueKind;
use crate::session::stand::{Stand, StandError};
use crate::session::store::MemoryStore;
use crate::stats::{DailyStatistics, MonthlySummary};

fn command_err(err: CommandError) -> PyErr {
    match err.kind() {
        ErrorKind::Validation => PyValueError::new_err(err.to_string()),
        ErrorKind::NotFound => PyKeyError::new_err(err.to_string()),
    }
}

fn stand_err(err: StandError) -> PyErr {
    match err {
        StandError::Command(err) => command_err(err),
        StandError::Config(err) => PyValueError::new_err(err.to_string()),
        StandError::Store(err) => PyRuntimeError::new_err(err.to_string()),
    }
}

fn json_err<E: std::fmt::Display>(err: E) -> PyErr {
    PyRuntimeError::new_err(format!("Serialization failed: {}", err))
}

fn parse_kind(kind: &str) -> PyResult<QueueKind> {
    kind.parse::<QueueKind>()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Python handle on an in-memory stand session
#[pyclass(name = "TaxiStand")]
pub struct PyStand {
    inner: Stand<MemoryStore, SystemClock>,
}

#[pymethods]
impl PyStand {
    /// Open a stand, optionally with a JSON config document
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => {
                StandConfig::from_json(json).map_err(|e| PyValueError::new_err(e.to_string()))?
            }
            None => StandConfig::default(),
        };
        let inner = Stand::open(MemoryStore::new(), SystemClock, config).map_err(stand_err)?;
        Ok(PyStand { inner })
    }

    fn add_mobile(&mut self, mobile_id: &str) -> PyResult<()> {
        self.inner.add_mobile(mobile_id).map_err(stand_err)
    }

    fn assign_fare(&mut self, mobile_id: &str, queue_kind: &str, amount: i64) -> PyResult<()> {
        let kind = parse_kind(queue_kind)?;
        self.inner.assign_fare(mobile_id, kind, amount).map_err(stand_err)
    }

    fn defer_turn(&mut self, mobile_id: &str, queue_kind: &str) -> PyResult<()> {
        let kind = parse_kind(queue_kind)?;
        self.inner.defer_turn(mobile_id, kind).map_err(stand_err)
    }

    fn remove_mobile(&mut self, mobile_id: &str) -> PyResult<()> {
        self.inner.remove_mobile(mobile_id).map_err(stand_err)
    }

    fn toggle_correction_mode(&mut self) -> PyResult<()> {
        self.inner.toggle_correction_mode().map_err(stand_err)
    }

    fn edit_fare(&mut self, mobile_id: &str, fare_id: &str, amount: i64) -> PyResult<()> {
        self.inner.edit_fare(mobile_id, fare_id, amount).map_err(stand_err)
    }

    fn delete_fare(&mut self, mobile_id: &str, fare_id: &str) -> PyResult<()> {
        self.inner.delete_fare(mobile_id, fare_id).map_err(stand_err)
    }

    /// Returns True when this call archived today's state
    fn reset_day(&mut self) -> PyResult<bool> {
        self.inner.reset_day().map_err(stand_err)
    }

    fn today(&self) -> String {
        self.inner.today().to_string()
    }

    fn snapshot_json(&self) -> PyResult<String> {
        snapshot::to_json(self.inner.state()).map_err(json_err)
    }

    /// One archived day as JSON, or the whole archive map when `date` is None
    #[pyo3(signature = (date=None))]
    fn archive_json(&self, date: Option<&str>) -> PyResult<Option<String>> {
        match date {
            Some(date) => self
                .inner
                .archive(Some(date))
                .map(|entry| serde_json::to_string(entry).map_err(json_err))
                .transpose(),
            None => serde_json::to_string(self.inner.archive_all())
                .map(Some)
                .map_err(json_err),
        }
    }

    fn daily_statistics_json(&self) -> PyResult<String> {
        let stats = DailyStatistics::from_state(self.inner.today(), self.inner.state());
        serde_json::to_string(&stats).map_err(json_err)
    }

    fn monthly_summary_json(&self, month: &str) -> PyResult<String> {
        let summary = MonthlySummary::from_archive(self.inner.archive_all(), month);
        serde_json::to_string(&summary).map_err(json_err)
    }
}
