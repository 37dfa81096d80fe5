//! Weekday-set recurrence expansion with an explicit past-instance filter.
//!
//! Expansion is strictly window-bounded: indefinite rules are synthesized one
//! query window at a time rather than pre-materializing future occurrences.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// Weekdays the rule fires on, 0 = Sunday .. 6 = Saturday.
    pub days: Vec<u8>,

    /// No end date; bounded in practice by the query window.
    pub is_indefinite: bool,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Every Nth week; 1 = weekly.
    pub interval_weeks: u32,
}

impl RecurrenceRule {
    /// Weekly rule over the given weekdays with no end date.
    pub fn weekly(days: Vec<u8>) -> Self {
        Self {
            days,
            is_indefinite: true,
            start_date: None,
            end_date: None,
            interval_weeks: 1,
        }
    }

    pub fn bounded(days: Vec<u8>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            days,
            is_indefinite: false,
            start_date: Some(start_date),
            end_date: Some(end_date),
            interval_weeks: 1,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() {
            return Err(ConfigError::EmptyRecurrenceDays);
        }
        if let Some(&day) = self.days.iter().find(|&&d| d > 6) {
            return Err(ConfigError::RecurrenceDayOutOfRange { day });
        }
        if self.interval_weeks == 0 {
            return Err(ConfigError::ZeroRecurrenceInterval);
        }
        if !self.is_indefinite {
            let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
                return Err(ConfigError::MissingRecurrenceDates);
            };
            if start >= end {
                return Err(ConfigError::RecurrenceDateOrder);
            }
        }
        Ok(())
    }

    /// Enumerate occurrence dates inside `[window_start, window_end]`.
    ///
    /// `occurrence_end` is the same-day clock end of each occurrence, used by
    /// the past-instance filter: dates before `today` are dropped, and
    /// `today` itself is dropped once that end time has elapsed. Callers
    /// expanding a cross-midnight task pass the first segment's boundary end
    /// (1440), which never elapses same-day.
    ///
    /// `interval_weeks > 1` counts Sunday-aligned weeks from the rule's
    /// start date (or the window start for indefinite rules).
    pub fn expand(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
        today: NaiveDate,
        now_minutes: u32,
        occurrence_end: u32,
    ) -> Vec<NaiveDate> {
        let anchor = match (self.is_indefinite, self.start_date) {
            (false, Some(start)) => start,
            _ => window_start,
        };
        let anchor_week = week_start(anchor);

        let mut out = Vec::new();
        let mut d = window_start;
        while d <= window_end {
            if self.matches(d, anchor_week) && !self.is_past(d, today, now_minutes, occurrence_end)
            {
                out.push(d);
            }
            d += Duration::days(1);
        }
        out
    }

    fn matches(&self, date: NaiveDate, anchor_week: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_sunday() as u8;
        if !self.days.contains(&weekday) {
            return false;
        }
        if !self.is_indefinite {
            let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
                return false;
            };
            if date < start || date > end {
                return false;
            }
        }
        if self.interval_weeks > 1 {
            let weeks = (week_start(date) - anchor_week).num_days() / 7;
            if weeks < 0 || weeks as u32 % self.interval_weeks != 0 {
                return false;
            }
        }
        true
    }

    /// Recurring tasks never retroactively create entries for elapsed moments.
    fn is_past(&self, date: NaiveDate, today: NaiveDate, now_minutes: u32, end: u32) -> bool {
        date < today || (date == today && end <= now_minutes)
    }
}

/// Sunday on or before `date` (0 = Sunday convention).
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}
