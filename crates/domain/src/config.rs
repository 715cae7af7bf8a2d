//! Configuration management.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DB_POOL_SIZE, DEFAULT_SLOT_GRANULARITY_MINUTES, DEFAULT_VISIT_DURATION_MINUTES,
};
use crate::errors::{Result, SchedulingError};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub scheduling: SchedulingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Tenant-default scheduling configuration.
///
/// Individual calls may override the operating window; these values are the
/// fallback when a tenant has not configured one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    pub default_duration_minutes: u32,
    pub operating_hours: OperatingHours,
}

/// A tenant's operating window and slot granularity, tenant-local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub slot_minutes: u32,
}

impl OperatingHours {
    /// Validate that the window is non-empty and the granularity usable.
    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes == 0 {
            return Err(SchedulingError::validation(
                "slot_minutes",
                "slot granularity must be positive",
            ));
        }
        if self.open >= self.close {
            return Err(SchedulingError::validation(
                "operating_hours",
                "opening time must precede closing time",
            ));
        }
        Ok(())
    }

    /// Slot step as a chrono duration.
    pub fn slot_step(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            slot_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "showings.db".to_string(),
                pool_size: DEFAULT_DB_POOL_SIZE,
            },
            scheduling: SchedulingConfig {
                default_duration_minutes: DEFAULT_VISIT_DURATION_MINUTES,
                operating_hours: OperatingHours::default(),
            },
        }
    }
}
