//! Error types for the scheduling engine.

use thiserror::Error;

/// Malformed clock-time input. Always recoverable by validating input
/// before it reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("invalid time '{input}': expected zero-padded 24-hour HH:MM")]
    Format { input: String },
}

/// Internally inconsistent configuration. Fatal to a scheduling call;
/// meant to be caught once at configuration-save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("day window end ({end_minutes}) must be after start ({start_minutes})")]
    WindowOrder { start_minutes: u32, end_minutes: u32 },

    #[error("lunch end ({end_minutes}) must be after lunch start ({start_minutes})")]
    LunchOrder { start_minutes: u32, end_minutes: u32 },

    #[error("lunch break must fall inside the day window")]
    LunchOutsideWindow,

    #[error("recurrence rule has no weekdays")]
    EmptyRecurrenceDays,

    #[error("recurrence weekday {day} is out of range (0 = Sunday .. 6 = Saturday)")]
    RecurrenceDayOutOfRange { day: u8 },

    #[error("recurrence interval must be at least 1 week")]
    ZeroRecurrenceInterval,

    #[error("bounded recurrence requires both a start and an end date")]
    MissingRecurrenceDates,

    #[error("recurrence end date must be after its start date")]
    RecurrenceDateOrder,
}

/// Raised by duration validation, never by the scheduler itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration of {minutes} minutes is below the 5-minute minimum")]
    TooShort { minutes: u32 },

    #[error("inferred duration of {minutes} minutes exceeds the cap for machine-estimated tasks")]
    TooLong { minutes: u32 },
}
