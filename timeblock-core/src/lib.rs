//! timeblock-core: deterministic time-block placement engine.
//!
//! Pure functions only: every input (tasks, busy intervals, configuration,
//! "now") is passed explicitly, nothing is cached between calls, and the
//! surrounding application owns all I/O.

pub mod clock;
pub mod config;
pub mod errors;
pub mod extract;
pub mod overlap;
pub mod recurrence;
pub mod scheduler;
pub mod task;

pub use clock::{
    DaySegment, MAX_INFERRED_MINUTES, MIN_TASK_MINUTES, MINUTES_PER_DAY, crosses_midnight,
    duration_minutes, format_time, parse_time, split_cross_day, validate_duration,
};
pub use config::{DayProfile, WorkdayConfig, is_weekend};
pub use errors::{ClockError, ConfigError, DurationError};
pub use extract::{TaskDraft, parse_line, parse_lines};
pub use overlap::{OverlapGroup, ScheduledItem, group_overlaps};
pub use recurrence::RecurrenceRule;
pub use scheduler::{BusyInterval, Placement, ScheduleOutcome, schedule};
pub use task::{Priority, TaskCandidate};
