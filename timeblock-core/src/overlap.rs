//! Overlap grouping for calendar presentation.
//!
//! Collapses simultaneous items on one day into summary groups. Groups are
//! connected components of pairwise overlap: two items land in the same
//! group if a chain of overlaps links them, even when they never touch each
//! other directly. Presentation-only; the placement engine never calls this.

use serde::{Deserialize, Serialize};

use crate::clock::duration_minutes;

/// Any scheduled thing on a single day, reduced to its interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub id: String,
    /// Half-open [start, end) in minutes since midnight.
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapGroup {
    pub items: Vec<ScheduledItem>,
    /// Earliest start across the group.
    pub start: u32,
    /// Latest end across the group.
    pub end: u32,
    pub total_minutes: u32,
}

/// Group mutually-overlapping items on one day.
///
/// Items that overlap nothing are omitted; callers render those normally and
/// collapse only the returned groups.
pub fn group_overlaps(items: &[ScheduledItem]) -> Vec<OverlapGroup> {
    let mut sorted: Vec<&ScheduledItem> = items.iter().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut groups: Vec<OverlapGroup> = Vec::new();
    for item in sorted {
        match groups.last_mut() {
            Some(g) if item.start < g.end => {
                g.items.push(item.clone());
                g.end = g.end.max(item.end);
                g.total_minutes += duration_minutes(item.start, item.end);
            }
            _ => groups.push(OverlapGroup {
                items: vec![item.clone()],
                start: item.start,
                end: item.end,
                total_minutes: duration_minutes(item.start, item.end),
            }),
        }
    }

    groups.retain(|g| g.items.len() > 1);
    groups
}
