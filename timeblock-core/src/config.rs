//! Workday configuration: per-day-class working windows and capacity caps.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::clock::MINUTES_PER_DAY;
use crate::errors::ConfigError;

/// Working hours for one day class (weekday or weekend): the available
/// window minus a single lunch exclusion, plus a cap on total task minutes
/// regardless of remaining open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProfile {
    /// Minutes since midnight.
    pub start: u32,
    pub end: u32,
    pub lunch_start: u32,
    pub lunch_end: u32,
    /// Max task minutes placeable in the day, independent of open slots.
    pub max_minutes: u32,
}

impl DayProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end <= self.start || self.end > MINUTES_PER_DAY {
            return Err(ConfigError::WindowOrder {
                start_minutes: self.start,
                end_minutes: self.end,
            });
        }
        if self.lunch_end <= self.lunch_start {
            return Err(ConfigError::LunchOrder {
                start_minutes: self.lunch_start,
                end_minutes: self.lunch_end,
            });
        }
        if self.lunch_start < self.start || self.lunch_end > self.end {
            return Err(ConfigError::LunchOutsideWindow);
        }
        Ok(())
    }

    /// Open minutes in the window after the lunch exclusion.
    pub fn window_minutes(&self) -> u32 {
        (self.end - self.start) - (self.lunch_end - self.lunch_start)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdayConfig {
    pub weekday: DayProfile,
    pub weekend: DayProfile,
    pub allow_weekends: bool,
}

impl Default for WorkdayConfig {
    fn default() -> Self {
        Self {
            // 09:00-17:00, lunch 12:00-13:00.
            weekday: DayProfile {
                start: 9 * 60,
                end: 17 * 60,
                lunch_start: 12 * 60,
                lunch_end: 13 * 60,
                max_minutes: 6 * 60,
            },
            // 10:00-16:00, lunch 12:30-13:30.
            weekend: DayProfile {
                start: 10 * 60,
                end: 16 * 60,
                lunch_start: 12 * 60 + 30,
                lunch_end: 13 * 60 + 30,
                max_minutes: 4 * 60,
            },
            allow_weekends: false,
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl WorkdayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weekday.validate()?;
        self.weekend.validate()?;
        Ok(())
    }

    /// Profile for a calendar day, or `None` when the day is closed to
    /// scheduling (weekend with weekends disallowed).
    pub fn profile_for(&self, date: NaiveDate) -> Option<&DayProfile> {
        if is_weekend(date) {
            if !self.allow_weekends {
                return None;
            }
            Some(&self.weekend)
        } else {
            Some(&self.weekday)
        }
    }
}
