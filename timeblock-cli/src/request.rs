//! JSON wire types for a scheduling request, plus the caller-side flow the
//! engine expects: fixed events become busy intervals (split at midnight),
//! recurrence expands to concrete dates, and flexible tasks are placed by
//! the engine around everything else.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use timeblock_core::{
    BusyInterval, Placement, Priority, RecurrenceRule, ScheduleOutcome, TaskCandidate,
    WorkdayConfig, crosses_midnight, duration_minutes, parse_time, schedule, split_cross_day,
    validate_duration,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,

    /// Defaults to the system clock in the configured timezone.
    #[serde(default)]
    pub today: Option<NaiveDate>,
    /// "HH:MM".
    #[serde(default)]
    pub now: Option<String>,

    pub tasks: Vec<TaskSpec>,

    #[serde(default)]
    pub busy: Vec<BusySpec>,
}

/// One task in a request.
///
/// A spec with `date` + `start_time` + `end_time` is a fixed event: it is
/// placed verbatim (split at midnight when it crosses) and blocks flexible
/// placement. Everything else is a flexible candidate the engine positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub duration_minutes: Option<u32>,

    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub complexity: Option<u8>,

    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
}

/// Already-occupied time, e.g. an externally synced calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusySpec {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

impl PlanRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse plan request")
    }

    /// Run the full flow and return every task's fate.
    pub fn execute(
        &self,
        config: &WorkdayConfig,
        today: NaiveDate,
        now_minutes: u32,
    ) -> Result<ScheduleOutcome> {
        if self.window_end < self.window_start {
            bail!(
                "window end {} is before window start {}",
                self.window_end,
                self.window_start
            );
        }

        let mut busy = self.resolve_busy()?;
        let mut placements: Vec<Placement> = Vec::new();
        let mut unplaced: Vec<String> = Vec::new();
        let mut flexible: Vec<TaskCandidate> = Vec::new();
        let mut recurring: Vec<(TaskCandidate, Vec<NaiveDate>)> = Vec::new();

        // Fixed events first: they are immovable and gate everything else.
        for spec in &self.tasks {
            match self.classify(spec, today, now_minutes)? {
                Classified::Fixed(date, start, end) => {
                    self.push_fixed(spec, date, start, end, &mut placements, &mut busy);
                }
                Classified::FixedRecurring(dates, start, end) => {
                    for date in dates {
                        let occurrence = occurrence_spec(spec, date);
                        self.push_fixed(&occurrence, date, start, end, &mut placements, &mut busy);
                    }
                }
                Classified::Flexible(candidate) => flexible.push(candidate),
                Classified::FlexibleRecurring(candidate, dates) => {
                    recurring.push((candidate, dates));
                }
            }
        }

        // Flexible one-off tasks roam the whole window.
        let out = schedule(
            &flexible,
            self.window_start,
            self.window_end,
            today,
            now_minutes,
            config,
            &busy,
        )?;
        busy.extend(out.placements.iter().map(placement_to_busy));
        placements.extend(out.placements);
        unplaced.extend(out.unplaced);

        // Each recurring occurrence is pinned to its own date.
        for (candidate, dates) in recurring {
            for date in dates {
                let occurrence = TaskCandidate {
                    id: occurrence_id(&candidate.id, date),
                    ..candidate.clone()
                };
                let out = schedule(&[occurrence], date, date, today, now_minutes, config, &busy)?;
                busy.extend(out.placements.iter().map(placement_to_busy));
                placements.extend(out.placements);
                unplaced.extend(out.unplaced);
            }
        }

        placements.sort_by(|a, b| a.date.cmp(&b.date).then(a.start.cmp(&b.start)));
        Ok(ScheduleOutcome {
            placements,
            unplaced,
        })
    }

    fn resolve_busy(&self) -> Result<Vec<BusyInterval>> {
        let mut out = Vec::new();
        for spec in &self.busy {
            let start = parse_time(&spec.start_time)?;
            let end = parse_time(&spec.end_time)?;
            if crosses_midnight(start, end) {
                let (a, b) = split_cross_day(spec.date, start, end);
                out.push(BusyInterval {
                    date: a.date,
                    start: a.start,
                    end: a.end,
                });
                out.push(BusyInterval {
                    date: b.date,
                    start: b.start,
                    end: b.end,
                });
            } else {
                out.push(BusyInterval {
                    date: spec.date,
                    start,
                    end,
                });
            }
        }
        Ok(out)
    }

    fn classify(&self, spec: &TaskSpec, today: NaiveDate, now_minutes: u32) -> Result<Classified> {
        let explicit_times = match (&spec.start_time, &spec.end_time) {
            (Some(s), Some(e)) => Some((parse_time(s)?, parse_time(e)?)),
            (None, None) => None,
            _ => bail!("task '{}': start_time and end_time must come together", spec.id),
        };

        if let Some((start, end)) = explicit_times {
            let minutes = duration_minutes(start, end);
            validate_duration(minutes, false, true)
                .with_context(|| format!("task '{}'", spec.id))?;

            if let Some(rule) = &spec.recurrence {
                rule.validate().with_context(|| format!("task '{}'", spec.id))?;
                // Cross-midnight occurrences pass the day-boundary end so a
                // still-running task tonight is not filtered as elapsed.
                let filter_end = if crosses_midnight(start, end) { 1440 } else { end };
                let dates = rule.expand(
                    self.window_start,
                    self.window_end,
                    today,
                    now_minutes,
                    filter_end,
                );
                return Ok(Classified::FixedRecurring(dates, start, end));
            }

            let date = spec
                .date
                .with_context(|| format!("task '{}': fixed times need a date", spec.id))?;
            return Ok(Classified::Fixed(date, start, end));
        }

        // Flexible: duration given explicitly, or estimated and capped.
        let (minutes, inferred) = match spec.duration_minutes {
            Some(m) => (m, false),
            None => (30, true),
        };
        validate_duration(minutes, inferred, false)
            .with_context(|| format!("task '{}'", spec.id))?;

        let mut candidate = TaskCandidate::new(spec.id.clone(), spec.name.clone())
            .with_duration(minutes)
            .with_priority(spec.priority.unwrap_or(Priority::Standard));
        if let Some(c) = spec.complexity {
            candidate = candidate.with_complexity(c);
        }

        if let Some(rule) = &spec.recurrence {
            rule.validate().with_context(|| format!("task '{}'", spec.id))?;
            let dates = rule.expand(
                self.window_start,
                self.window_end,
                today,
                now_minutes,
                1440,
            );
            return Ok(Classified::FlexibleRecurring(candidate, dates));
        }

        Ok(Classified::Flexible(candidate))
    }

    fn push_fixed(
        &self,
        spec: &TaskSpec,
        date: NaiveDate,
        start: u32,
        end: u32,
        placements: &mut Vec<Placement>,
        busy: &mut Vec<BusyInterval>,
    ) {
        if crosses_midnight(start, end) {
            let (a, b) = split_cross_day(date, start, end);
            for seg in [a, b] {
                placements.push(Placement {
                    task_id: spec.id.clone(),
                    date: seg.date,
                    start: seg.start,
                    end: seg.end,
                    duration_minutes: seg.minutes(),
                    day_index: self.day_index(seg.date),
                });
                busy.push(BusyInterval {
                    date: seg.date,
                    start: seg.start,
                    end: seg.end,
                });
            }
        } else {
            placements.push(Placement {
                task_id: spec.id.clone(),
                date,
                start,
                end,
                duration_minutes: end - start,
                day_index: self.day_index(date),
            });
            busy.push(BusyInterval { date, start, end });
        }
    }

    fn day_index(&self, date: NaiveDate) -> usize {
        (date - self.window_start).num_days().max(0) as usize
    }
}

enum Classified {
    Fixed(NaiveDate, u32, u32),
    FixedRecurring(Vec<NaiveDate>, u32, u32),
    Flexible(TaskCandidate),
    FlexibleRecurring(TaskCandidate, Vec<NaiveDate>),
}

fn occurrence_id(id: &str, date: NaiveDate) -> String {
    format!("{id}@{date}")
}

fn occurrence_spec(spec: &TaskSpec, date: NaiveDate) -> TaskSpec {
    TaskSpec {
        id: occurrence_id(&spec.id, date),
        date: Some(date),
        recurrence: None,
        ..spec.clone()
    }
}

fn placement_to_busy(p: &Placement) -> BusyInterval {
    BusyInterval {
        date: p.date,
        start: p.start,
        end: p.end,
    }
}
