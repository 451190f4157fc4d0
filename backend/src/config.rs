//! Stand configuration
//!
//! Policy knobs that the rest of the crate reads instead of hard-coding:
//! the deferral streak threshold, the archive retention window and the
//! operational timezone offset.

use crate::core::clock::OperationalTimezone;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating a [`StandConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("defer_threshold must be at least 1")]
    ZeroDeferThreshold,

    #[error("retention_days must be at least 1")]
    ZeroRetention,

    #[error("utc_offset_seconds {0} is outside +/- 24h")]
    InvalidUtcOffset(i32),
}

/// Runtime policy for a dispatch stand
///
/// Missing fields fall back to the defaults, so `{}` is a valid config.
///
/// # Example
/// ```
/// use taxi_stand_core_rs::StandConfig;
///
/// let config = StandConfig::from_json(r#"{ "retention_days": 45 }"#).unwrap();
/// assert_eq!(config.retention_days, 45);
/// assert_eq!(config.defer_threshold, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandConfig {
    /// Consecutive deferrals after which a mobile's streak counter restarts
    pub defer_threshold: u32,

    /// Days of archive kept on day rollover
    pub retention_days: u32,

    /// Operational timezone, seconds east of UTC
    pub utc_offset_seconds: i32,
}

impl Default for StandConfig {
    fn default() -> Self {
        Self {
            defer_threshold: 3,
            retention_days: 30,
            utc_offset_seconds: OperationalTimezone::CHILE_OFFSET_SECONDS,
        }
    }
}

impl StandConfig {
    /// Parse and validate a JSON config document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: StandConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defer_threshold == 0 {
            return Err(ConfigError::ZeroDeferThreshold);
        }
        if self.retention_days == 0 {
            return Err(ConfigError::ZeroRetention);
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<OperationalTimezone, ConfigError> {
        OperationalTimezone::from_offset_seconds(self.utc_offset_seconds)
            .ok_or(ConfigError::InvalidUtcOffset(self.utc_offset_seconds))
    }
}
