//! Deterministic free-text task drafts.
//!
//! Cheap heuristics before any model call: a line like
//! "write quarterly report 90m p1" becomes a structured candidate without an
//! extraction service. Lines without a duration token get a default estimate
//! and are marked inferred so the machine-estimate cap applies.

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::clock::validate_duration;
use crate::task::{Priority, TaskCandidate};

/// Estimate used when the text carries no duration token.
const DEFAULT_ESTIMATE_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    pub duration_minutes: u32,
    pub priority: Priority,
    /// False when the duration came from an explicit token in the text.
    pub inferred_duration: bool,
}

impl TaskDraft {
    pub fn into_candidate(self, id: impl Into<String>) -> TaskCandidate {
        TaskCandidate::new(id, self.name)
            .with_duration(self.duration_minutes)
            .with_priority(self.priority)
    }
}

/// Parse one free-text line into a draft.
///
/// Recognized tokens: durations ("90m", "45 min", "1.5h", "1h30m") and
/// priorities ("p1".."p4"); keyword fallbacks cover "urgent"/"asap",
/// "important" and "someday"/"whenever". Tokens are stripped from the name.
pub fn parse_line(line: &str) -> Result<TaskDraft> {
    let mut text = line.trim().to_string();
    if text.is_empty() {
        bail!("empty task line");
    }

    let combined_re = Regex::new(r"(?i)\b(\d+)\s*h(?:ours?|rs?)?\s*(\d+)\s*m(?:in(?:ute)?s?)?\b")?;
    let hours_re = Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*h(?:ours?|rs?)?\b")?;
    let minutes_re = Regex::new(r"(?i)\b(\d+)\s*m(?:in(?:ute)?s?)?\b")?;
    let priority_re = Regex::new(r"(?i)\bp([1-4])\b")?;

    let mut duration: Option<u32> = None;
    if let Some(c) = combined_re.captures(&text) {
        let hours: u32 = c[1].parse().context("hour token")?;
        let minutes: u32 = c[2].parse().context("minute token")?;
        duration = Some(hours * 60 + minutes);
        text = combined_re.replace(&text, " ").into_owned();
    } else if let Some(c) = hours_re.captures(&text) {
        let hours: f64 = c[1].parse().context("hour token")?;
        duration = Some((hours * 60.0).round() as u32);
        text = hours_re.replace(&text, " ").into_owned();
    } else if let Some(c) = minutes_re.captures(&text) {
        duration = Some(c[1].parse().context("minute token")?);
        text = minutes_re.replace(&text, " ").into_owned();
    }

    let mut priority: Option<Priority> = None;
    if let Some(c) = priority_re.captures(&text) {
        priority = Some(match &c[1] {
            "1" => Priority::Critical,
            "2" => Priority::High,
            "3" => Priority::Standard,
            _ => Priority::Low,
        });
        text = priority_re.replace(&text, " ").into_owned();
    }

    // Keyword fallbacks when no explicit priority token was given.
    let lower = text.to_lowercase();
    let priority = priority.unwrap_or_else(|| {
        if lower.contains("urgent") || lower.contains("asap") {
            Priority::Critical
        } else if lower.contains("important") {
            Priority::High
        } else if lower.contains("someday") || lower.contains("whenever") {
            Priority::Low
        } else {
            Priority::Standard
        }
    });

    let (duration_minutes, inferred_duration) = match duration {
        Some(m) => (m, false),
        None => (DEFAULT_ESTIMATE_MINUTES, true),
    };
    validate_duration(duration_minutes, inferred_duration, false)
        .with_context(|| format!("task line '{line}'"))?;

    let name = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == ',' || c == ':')
        .trim()
        .to_string();
    if name.is_empty() {
        bail!("task line '{line}' has no name left after token extraction");
    }

    Ok(TaskDraft {
        name,
        duration_minutes,
        priority,
        inferred_duration,
    })
}

/// Parse every non-blank line of a block of text.
pub fn parse_lines(text: &str) -> Result<Vec<TaskDraft>> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(parse_line)
        .collect()
}
