//! Clock arithmetic on minutes-since-midnight.
//!
//! Times are plain `u32` minutes; dates are `chrono::NaiveDate`. A day spans
//! `[0, 1440)`. Cross-midnight math treats the day boundary as exclusive
//! 1440; only the rendered label for that boundary is `"23:59"`.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{ClockError, DurationError};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Shortest schedulable task.
pub const MIN_TASK_MINUTES: u32 = 5;

/// Cap applied to machine-inferred durations without an explicit end.
pub const MAX_INFERRED_MINUTES: u32 = 480;

/// Parse a strict zero-padded 24-hour `HH:MM` into minutes since midnight.
pub fn parse_time(s: &str) -> Result<u32, ClockError> {
    let err = || ClockError::Format {
        input: s.to_string(),
    };

    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(err());
    }
    if !bytes[..2].iter().all(u8::is_ascii_digit) || !bytes[3..].iter().all(u8::is_ascii_digit) {
        return Err(err());
    }

    let hour: u32 = s[..2].parse().map_err(|_| err())?;
    let minute: u32 = s[3..].parse().map_err(|_| err())?;
    if hour > 23 || minute > 59 {
        return Err(err());
    }

    Ok(hour * 60 + minute)
}

/// Format minutes since midnight as `HH:MM`.
///
/// The exclusive day boundary (1440) renders as the persisted label `23:59`;
/// duration arithmetic keeps using 1440 so segment durations stay exact.
pub fn format_time(minutes: u32) -> String {
    if minutes >= MINUTES_PER_DAY {
        return "23:59".to_string();
    }
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Minutes in the half-open interval `[start, end)`.
///
/// `end <= start` means the interval crosses midnight, so `end == start`
/// reads as a full 24 hours rather than zero.
pub fn duration_minutes(start: u32, end: u32) -> u32 {
    if end > start {
        end - start
    } else {
        (MINUTES_PER_DAY - start) + end
    }
}

/// True when `[start, end)` spans into the next calendar day.
pub fn crosses_midnight(start: u32, end: u32) -> bool {
    end <= start
}

/// One same-day slice of a (possibly cross-midnight) interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySegment {
    pub date: NaiveDate,
    pub start: u32,
    /// Exclusive; 1440 for a segment running to end of day.
    pub end: u32,
}

impl DaySegment {
    pub fn minutes(&self) -> u32 {
        self.end - self.start
    }
}

/// Split a cross-midnight interval into its two same-day segments.
///
/// Segment one runs to the exclusive boundary 1440 (label `23:59`), segment
/// two opens the next day at 00:00. Their minutes always sum to
/// `duration_minutes(start, end)`.
pub fn split_cross_day(date: NaiveDate, start: u32, end: u32) -> (DaySegment, DaySegment) {
    (
        DaySegment {
            date,
            start,
            end: MINUTES_PER_DAY,
        },
        DaySegment {
            date: date + Duration::days(1),
            start: 0,
            end,
        },
    )
}

/// Validate a task duration.
///
/// Machine-inferred durations without an explicit end are capped; explicit
/// user input has no upper bound.
pub fn validate_duration(
    minutes: u32,
    inferred: bool,
    has_explicit_end: bool,
) -> Result<(), DurationError> {
    if minutes < MIN_TASK_MINUTES {
        return Err(DurationError::TooShort { minutes });
    }
    if inferred && !has_explicit_end && minutes > MAX_INFERRED_MINUTES {
        return Err(DurationError::TooLong { minutes });
    }
    Ok(())
}
