//! Operational time for the stand
//!
//! The stand works on one fixed civil timezone (Chile, UTC-3) no matter where
//! the device clock is configured. Day keys (`YYYY-MM-DD`) and fare time labels
//! (`HH:MM:SS`) are always derived through [`OperationalTimezone`].
//!
//! Wall-clock reads go through the [`Clock`] trait so that the session layer can
//! be driven by a [`ManualClock`] in tests.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Format of archive day keys
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Format of fare time labels
pub const TIME_LABEL_FORMAT: &str = "%H:%M:%S";

/// Fixed civil timezone used to decide "today"
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use taxi_stand_core_rs::OperationalTimezone;
///
/// let tz = OperationalTimezone::chile();
/// // 02:30 UTC is still the previous evening in Chile
/// let at = Utc.with_ymd_and_hms(2026, 3, 10, 2, 30, 0).unwrap();
/// assert_eq!(tz.day_key(at), "2026-03-09");
/// assert_eq!(tz.time_label(at), "23:30:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationalTimezone {
    offset: FixedOffset,
}

impl OperationalTimezone {
    /// Chile, UTC-3
    pub const CHILE_OFFSET_SECONDS: i32 = -3 * 3600;

    /// Build a timezone from an offset east of UTC, in seconds
    ///
    /// Returns `None` when the offset is outside +/- 24h.
    pub fn from_offset_seconds(offset_seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(offset_seconds).map(|offset| Self { offset })
    }

    /// The stand's reference timezone
    pub fn chile() -> Self {
        Self::from_offset_seconds(Self::CHILE_OFFSET_SECONDS).unwrap_or(Self { offset: Utc.fix() })
    }

    pub fn offset_seconds(&self) -> i32 {
        self.offset.local_minus_utc()
    }

    /// Calendar date at `at` in this timezone
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Archive key (`YYYY-MM-DD`) for the operational day containing `at`
    pub fn day_key(&self, at: DateTime<Utc>) -> String {
        self.local_date(at).format(DAY_KEY_FORMAT).to_string()
    }

    /// `HH:MM:SS` label for a fare recorded at `at`
    pub fn time_label(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format(TIME_LABEL_FORMAT)
            .to_string()
    }
}

impl Default for OperationalTimezone {
    fn default() -> Self {
        Self::chile()
    }
}

/// Parse a `YYYY-MM-DD` day key
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT).ok()
}

/// Whether `key` is a well-formed day key
pub fn is_day_key(key: &str) -> bool {
    key.len() == 10 && parse_day_key(key).is_some()
}

/// Oldest day key kept when `today` retains `retention_days` of history
///
/// Keys strictly lower than the returned value are eligible for pruning.
///
/// # Example
/// ```
/// use taxi_stand_core_rs::core::clock::retention_cutoff;
///
/// assert_eq!(retention_cutoff("2026-03-31", 30).as_deref(), Some("2026-03-01"));
/// assert_eq!(retention_cutoff("not-a-date", 30), None);
/// ```
pub fn retention_cutoff(today: &str, retention_days: u32) -> Option<String> {
    parse_day_key(today)
        .and_then(|date| date.checked_sub_days(Days::new(u64::from(retention_days))))
        .map(|date| date.format(DAY_KEY_FORMAT).to_string())
}

/// Source of wall-clock time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same instant, so a test can keep a handle and advance the
/// clock owned by a session.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(now.timestamp_millis())),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.millis.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.millis
            .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or_default()
    }
}
