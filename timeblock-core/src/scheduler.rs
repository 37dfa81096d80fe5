//! Greedy time-block placement.
//!
//! Places candidate tasks into the earliest feasible slot across a multi-day
//! window: priority-ordered, first-fit, purely additive. Existing busy
//! intervals are never moved or shortened, no task is ever split here, and
//! every input task ends up in exactly one of `placements` or `unplaced`.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::MINUTES_PER_DAY;
use crate::config::WorkdayConfig;
use crate::errors::ConfigError;
use crate::task::TaskCandidate;

/// An already-occupied time range the scheduler must avoid. Read-only input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub date: NaiveDate,
    /// Half-open [start, end) in minutes since midnight.
    pub start: u32,
    pub end: u32,
}

/// A concrete (date, start, end) assignment of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub task_id: String,
    pub date: NaiveDate,
    pub start: u32,
    pub end: u32,
    pub duration_minutes: u32,
    /// Zero-based offset of `date` from the window start; maps back to
    /// calendar columns.
    pub day_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub placements: Vec<Placement>,
    /// Task ids that fit nowhere in the window. Not an error.
    pub unplaced: Vec<String>,
}

#[derive(Debug)]
struct DayState {
    date: NaiveDate,
    day_index: usize,
    /// Sorted, disjoint open slots [start, end).
    gaps: Vec<(u32, u32)>,
    /// Task minutes still placeable under the day-class cap.
    remaining_capacity: u32,
}

/// Place `tasks` into `[window_start, window_end]`.
///
/// `today`/`now_minutes` bound the past: days before `today` take nothing,
/// and on `today` the working window opens no earlier than `now_minutes`.
/// Configuration is validated up front; an over-full window is not an error
/// and surfaces as `unplaced` entries instead.
pub fn schedule(
    tasks: &[TaskCandidate],
    window_start: NaiveDate,
    window_end: NaiveDate,
    today: NaiveDate,
    now_minutes: u32,
    config: &WorkdayConfig,
    busy: &[BusyInterval],
) -> Result<ScheduleOutcome, ConfigError> {
    config.validate()?;

    let mut days = build_day_states(window_start, window_end, today, now_minutes, config, busy);

    // Priority asc, then complexity desc (absent sorts last), then duration
    // desc; the stable sort keeps input order as the final tiebreak.
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&a, &b| {
        let (ta, tb) = (&tasks[a], &tasks[b]);
        ta.priority
            .cmp(&tb.priority)
            .then_with(|| tb.complexity.unwrap_or(0).cmp(&ta.complexity.unwrap_or(0)))
            .then_with(|| tb.duration_minutes.cmp(&ta.duration_minutes))
    });

    let mut outcome = ScheduleOutcome::default();
    for idx in order {
        let task = &tasks[idx];
        match place_first_fit(&mut days, task) {
            Some(p) => outcome.placements.push(p),
            None => outcome.unplaced.push(task.id.clone()),
        }
    }

    outcome
        .placements
        .sort_by(|a, b| a.date.cmp(&b.date).then(a.start.cmp(&b.start)));
    Ok(outcome)
}

fn build_day_states(
    window_start: NaiveDate,
    window_end: NaiveDate,
    today: NaiveDate,
    now_minutes: u32,
    config: &WorkdayConfig,
    busy: &[BusyInterval],
) -> Vec<DayState> {
    let mut days = Vec::new();

    let mut date = window_start;
    let mut day_index = 0usize;
    while date <= window_end {
        if let Some(state) = day_state(date, day_index, today, now_minutes, config, busy) {
            days.push(state);
        }
        date += Duration::days(1);
        day_index += 1;
    }

    days
}

fn day_state(
    date: NaiveDate,
    day_index: usize,
    today: NaiveDate,
    now_minutes: u32,
    config: &WorkdayConfig,
    busy: &[BusyInterval],
) -> Option<DayState> {
    if date < today {
        return None;
    }
    let profile = config.profile_for(date)?;

    let mut open_start = profile.start;
    if date == today {
        open_start = open_start.max(now_minutes);
    }
    if open_start >= profile.end {
        return None;
    }

    let mut gaps = vec![(open_start, profile.end)];
    subtract(&mut gaps, profile.lunch_start, profile.lunch_end);

    let mut busy_minutes = 0u32;
    for b in busy.iter().filter(|b| b.date == date) {
        // Busy intervals arrive as same-day segments; a malformed end at or
        // before start is clipped to the day boundary.
        let end = if b.end <= b.start { MINUTES_PER_DAY } else { b.end };
        subtract(&mut gaps, b.start, end);
        busy_minutes += end - b.start;
    }

    // Open window after the `now` clamp, minus the part of lunch still
    // inside it.
    let window = profile.end - open_start;
    let lunch_overlap = profile
        .lunch_end
        .saturating_sub(profile.lunch_start.max(open_start));
    let open_minutes = window - lunch_overlap;

    let remaining_capacity = open_minutes
        .min(profile.max_minutes)
        .saturating_sub(busy_minutes);
    if remaining_capacity == 0 {
        return None;
    }

    Some(DayState {
        date,
        day_index,
        gaps,
        remaining_capacity,
    })
}

/// Remove `[cut_start, cut_end)` from a sorted disjoint gap list.
fn subtract(gaps: &mut Vec<(u32, u32)>, cut_start: u32, cut_end: u32) {
    if cut_end <= cut_start {
        return;
    }
    let mut out = Vec::with_capacity(gaps.len() + 1);
    for &(gap_start, gap_end) in gaps.iter() {
        if cut_end <= gap_start || cut_start >= gap_end {
            out.push((gap_start, gap_end));
            continue;
        }
        if cut_start > gap_start {
            out.push((gap_start, cut_start));
        }
        if cut_end < gap_end {
            out.push((cut_end, gap_end));
        }
    }
    *gaps = out;
}

/// First gap across the days, left to right, that fits both the task length
/// and the day's remaining capacity.
fn place_first_fit(days: &mut [DayState], task: &TaskCandidate) -> Option<Placement> {
    let need = task.duration_minutes;

    for day in days.iter_mut() {
        if day.remaining_capacity < need {
            continue;
        }
        let Some(pos) = day
            .gaps
            .iter()
            .position(|&(gap_start, gap_end)| gap_end - gap_start >= need)
        else {
            continue;
        };

        let start = day.gaps[pos].0;
        let end = start + need;
        subtract(&mut day.gaps, start, end);
        day.remaining_capacity -= need;

        return Some(Placement {
            task_id: task.id.clone(),
            date: day.date,
            start,
            end,
            duration_minutes: need,
            day_index: day.day_index,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Monday 2024-01-08; the week runs through Sunday the 14th.
    fn monday() -> NaiveDate {
        date(2024, 1, 8)
    }

    fn run(
        tasks: &[TaskCandidate],
        busy: &[BusyInterval],
        config: &WorkdayConfig,
    ) -> ScheduleOutcome {
        schedule(
            tasks,
            monday(),
            date(2024, 1, 12),
            monday(),
            0,
            config,
            busy,
        )
        .unwrap()
    }

    #[test]
    fn single_task_lands_at_window_open() {
        let tasks = vec![TaskCandidate::new("t1", "deep work")
            .with_duration(60)
            .with_priority(Priority::Critical)];

        let out = run(&tasks, &[], &WorkdayConfig::default());
        assert_eq!(out.unplaced.len(), 0);
        assert_eq!(out.placements.len(), 1);

        let p = &out.placements[0];
        assert_eq!(p.date, monday());
        assert_eq!((p.start, p.end), (540, 600)); // 09:00-10:00
        assert_eq!(p.day_index, 0);
    }

    #[test]
    fn fully_busy_day_spills_to_next() {
        let busy = vec![BusyInterval {
            date: monday(),
            start: 540,
            end: 1020,
        }];
        let tasks = vec![TaskCandidate::new("t1", "catch up").with_duration(30)];

        let out = run(&tasks, &busy, &WorkdayConfig::default());
        let p = &out.placements[0];
        assert_eq!(p.date, date(2024, 1, 9));
        assert_eq!(p.start, 540);
        assert_eq!(p.day_index, 1);
    }

    #[test]
    fn lunch_is_never_scheduled_over() {
        // 09:00-17:00 with lunch 12:00-13:00 leaves a 3h morning gap; a 4h
        // task must start after lunch.
        let tasks = vec![TaskCandidate::new("t1", "long block").with_duration(240)];

        let out = run(&tasks, &[], &WorkdayConfig::default());
        let p = &out.placements[0];
        assert_eq!((p.start, p.end), (780, 1020)); // 13:00-17:00
    }

    #[test]
    fn daily_cap_spills_even_with_open_slots() {
        // Two 4h tasks against a 300-minute cap: only one fits the day even
        // though the raw window could hold both.
        let mut config = WorkdayConfig::default();
        config.weekday.max_minutes = 300;

        let tasks = vec![
            TaskCandidate::new("t1", "first").with_duration(240),
            TaskCandidate::new("t2", "second").with_duration(240),
        ];

        let out = run(&tasks, &[], &config);
        assert_eq!(out.placements.len(), 2);
        assert_eq!(out.placements[0].date, monday());
        assert_eq!(out.placements[1].date, date(2024, 1, 9));
    }

    #[test]
    fn critical_beats_low_for_the_last_slot() {
        // One-day window with room for a single 60-minute task.
        let mut config = WorkdayConfig::default();
        config.weekday.max_minutes = 60;

        let tasks = vec![
            TaskCandidate::new("low", "later").with_priority(Priority::Low).with_duration(60),
            TaskCandidate::new("crit", "now")
                .with_priority(Priority::Critical)
                .with_duration(60),
        ];

        let out = schedule(&tasks, monday(), monday(), monday(), 0, &config, &[]).unwrap();
        assert_eq!(out.placements.len(), 1);
        assert_eq!(out.placements[0].task_id, "crit");
        assert_eq!(out.unplaced, vec!["low".to_string()]);
    }

    #[test]
    fn complexity_breaks_priority_ties() {
        let tasks = vec![
            TaskCandidate::new("easy", "easy").with_duration(60).with_complexity(2),
            TaskCandidate::new("hard", "hard").with_duration(60).with_complexity(8),
        ];

        let out = run(&tasks, &[], &WorkdayConfig::default());
        // Harder task gets the earlier block.
        assert_eq!(out.placements[0].task_id, "hard");
        assert_eq!(out.placements[1].task_id, "easy");
        assert!(out.placements[0].start < out.placements[1].start);
    }

    #[test]
    fn weekends_skipped_unless_allowed() {
        // Window is Sat/Sun only.
        let sat = date(2024, 1, 13);
        let sun = date(2024, 1, 14);
        let tasks = vec![TaskCandidate::new("t1", "weekend task").with_duration(30)];

        let closed = WorkdayConfig::default();
        let out = schedule(&tasks, sat, sun, sat, 0, &closed, &[]).unwrap();
        assert_eq!(out.unplaced, vec!["t1".to_string()]);

        let open = WorkdayConfig {
            allow_weekends: true,
            ..closed
        };
        let out = schedule(&tasks, sat, sun, sat, 0, &open, &[]).unwrap();
        let p = &out.placements[0];
        assert_eq!(p.date, sat);
        assert_eq!(p.start, open.weekend.start);
    }

    #[test]
    fn today_window_opens_at_now() {
        // 14:30 now: the morning is gone, first fit starts at 14:30.
        let tasks = vec![TaskCandidate::new("t1", "afternoon").with_duration(60)];
        let out = schedule(
            &tasks,
            monday(),
            monday(),
            monday(),
            870,
            &WorkdayConfig::default(),
            &[],
        )
        .unwrap();
        assert_eq!((out.placements[0].start, out.placements[0].end), (870, 930));
    }

    #[test]
    fn days_before_today_take_nothing() {
        let tasks = vec![TaskCandidate::new("t1", "anything").with_duration(60)];
        // Window starts Monday but today is Wednesday.
        let out = schedule(
            &tasks,
            monday(),
            date(2024, 1, 12),
            date(2024, 1, 10),
            0,
            &WorkdayConfig::default(),
            &[],
        )
        .unwrap();
        assert_eq!(out.placements[0].date, date(2024, 1, 10));
        assert_eq!(out.placements[0].day_index, 2);
    }

    #[test]
    fn placements_and_busy_never_overlap() {
        let busy = vec![
            BusyInterval { date: monday(), start: 600, end: 660 },
            BusyInterval { date: monday(), start: 840, end: 900 },
        ];
        let tasks: Vec<TaskCandidate> = (0..6)
            .map(|i| TaskCandidate::new(format!("t{i}"), "fill").with_duration(55))
            .collect();

        let out = run(&tasks, &busy, &WorkdayConfig::default());

        let mut intervals: Vec<(NaiveDate, u32, u32)> = busy
            .iter()
            .map(|b| (b.date, b.start, b.end))
            .chain(out.placements.iter().map(|p| (p.date, p.start, p.end)))
            .collect();
        intervals.sort();
        for pair in intervals.windows(2) {
            let (d1, _, e1) = pair[0];
            let (d2, s2, _) = pair[1];
            assert!(d1 != d2 || e1 <= s2, "overlap: {pair:?}");
        }
    }

    #[test]
    fn every_task_is_accounted_for() {
        let tasks: Vec<TaskCandidate> = (0..20)
            .map(|i| TaskCandidate::new(format!("t{i}"), "bulk").with_duration(120))
            .collect();

        let out = run(&tasks, &[], &WorkdayConfig::default());
        assert_eq!(out.placements.len() + out.unplaced.len(), tasks.len());

        let mut seen: Vec<&str> = out
            .placements
            .iter()
            .map(|p| p.task_id.as_str())
            .chain(out.unplaced.iter().map(String::as_str))
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), tasks.len());
    }

    #[test]
    fn existing_busy_minutes_reduce_capacity() {
        // Cap 120 with 90 already busy leaves room for 30, not 60.
        let mut config = WorkdayConfig::default();
        config.weekday.max_minutes = 120;
        let busy = vec![BusyInterval { date: monday(), start: 540, end: 630 }];

        let tasks = vec![TaskCandidate::new("t1", "big").with_duration(60)];
        let out = schedule(&tasks, monday(), monday(), monday(), 0, &config, &busy).unwrap();
        assert_eq!(out.unplaced, vec!["t1".to_string()]);

        let tasks = vec![TaskCandidate::new("t2", "small").with_duration(30)];
        let out = schedule(&tasks, monday(), monday(), monday(), 0, &config, &busy).unwrap();
        assert_eq!(out.placements.len(), 1);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut config = WorkdayConfig::default();
        config.weekday.lunch_end = config.weekday.lunch_start;

        let err = schedule(&[], monday(), monday(), monday(), 0, &config, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::LunchOrder { .. }));
    }

    #[test]
    fn inputs_are_never_mutated() {
        let busy = vec![BusyInterval { date: monday(), start: 540, end: 600 }];
        let tasks = vec![TaskCandidate::new("t1", "t").with_duration(30)];
        let busy_before = busy.clone();
        let tasks_before = tasks.clone();

        run(&tasks, &busy, &WorkdayConfig::default());
        assert_eq!(busy, busy_before);
        assert_eq!(tasks, tasks_before);
    }
}
