//! Task candidate model consumed by the placement engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Scheduled first.
    Critical = 1,
    High = 2,
    Standard = 3,
    /// Scheduled last.
    Low = 4,
}

/// Immutable input to the scheduler.
///
/// Priority and complexity jointly influence placement order: lower priority
/// number first; within a priority, harder and longer tasks go earlier in
/// the day while slots are most open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCandidate {
    pub id: String,
    pub name: String,

    /// Minutes.
    pub duration_minutes: u32,

    pub priority: Priority,

    /// Optional 1-10 difficulty weight.
    pub complexity: Option<u8>,
}

impl TaskCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_minutes: 30,
            priority: Priority::Standard,
            complexity: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_complexity(mut self, complexity: u8) -> Self {
        self.complexity = Some(complexity);
        self
    }
}
