//! Placements -> ICS calendar export.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use timeblock_core::{MINUTES_PER_DAY, Placement};

pub struct CalendarEvent {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

/// Resolve minutes-since-midnight on a local date into UTC.
///
/// The exclusive day boundary 1440 rolls into the next day's midnight.
fn local_minutes_to_utc(date: NaiveDate, minutes: u32, tz: Tz) -> Result<DateTime<Utc>> {
    let (date, minutes) = if minutes >= MINUTES_PER_DAY {
        (date + Duration::days(1), minutes - MINUTES_PER_DAY)
    } else {
        (date, minutes)
    };

    let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .with_context(|| format!("clock time out of range: {minutes} minutes"))?;

    let local = tz
        .from_local_datetime(&date.and_time(time))
        .single()
        .with_context(|| format!("ambiguous or invalid local time (DST?): {date} {time} {tz}"))?;

    Ok(local.with_timezone(&Utc))
}

/// Convert placements into calendar events.
///
/// `names` maps task ids to display names; occurrence ids like `id@date`
/// fall back to the base id's name.
pub fn placements_to_events(
    placements: &[Placement],
    names: &HashMap<String, String>,
    tz: Tz,
) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::new();

    for p in placements {
        let base_id = p.task_id.split('@').next().unwrap_or(&p.task_id);
        let summary = names
            .get(&p.task_id)
            .or_else(|| names.get(base_id))
            .cloned()
            .unwrap_or_else(|| p.task_id.clone());

        events.push(CalendarEvent {
            start_utc: local_minutes_to_utc(p.date, p.start, tz)?,
            end_utc: local_minutes_to_utc(p.date, p.end, tz)?,
            summary,
            description: format!(
                "TaskId: {}\nDuration: {} min\nDay: {}\n",
                p.task_id, p.duration_minutes, p.date
            ),
        });
    }

    Ok(events)
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are UTC.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Timeblock//EN\n");

    for (i, e) in events.iter().enumerate() {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\n");
        s.push_str(&format!("UID:timeblock-{}@timeblock\n", i));
        s.push_str(&format!("DTSTART:{}\n", dtstart));
        s.push_str(&format!("DTEND:{}\n", dtend));
        s.push_str(&format!("SUMMARY:{}\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\n");
    }

    s.push_str("END:VCALENDAR\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
