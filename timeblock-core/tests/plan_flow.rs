use chrono::NaiveDate;
use timeblock_core::{
    BusyInterval, Priority, RecurrenceRule, TaskCandidate, WorkdayConfig, duration_minutes,
    group_overlaps, parse_lines, schedule, split_cross_day,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// End-to-end: free-text drafts -> candidates -> placements, with an
/// existing meeting blocking the morning.
#[test]
fn test_drafts_schedule_around_existing_meeting() {
    let drafts = parse_lines(
        "finish design doc 2h p1\n\
         review pull requests 45m p2\n\
         inbox sweep 30m\n",
    )
    .unwrap();

    let tasks: Vec<TaskCandidate> = drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| d.into_candidate(format!("task-{i}")))
        .collect();

    // Monday 2024-01-08; a 09:00-10:30 meeting already on the calendar.
    let monday = date(2024, 1, 8);
    let busy = vec![BusyInterval {
        date: monday,
        start: 540,
        end: 630,
    }];

    let out = schedule(
        &tasks,
        monday,
        date(2024, 1, 12),
        monday,
        0,
        &WorkdayConfig::default(),
        &busy,
    )
    .unwrap();

    assert!(out.unplaced.is_empty());
    assert_eq!(out.placements.len(), 3);

    // The design doc is priority 1 but needs 2h: the 10:30-12:00 gap is too
    // short, so it takes the first block after lunch.
    let design = out
        .placements
        .iter()
        .find(|p| p.task_id == "task-0")
        .unwrap();
    assert_eq!(design.date, monday);
    assert_eq!((design.start, design.end), (780, 900)); // 13:00-15:00

    // The shorter tasks backfill the morning gap in priority order.
    let review = out
        .placements
        .iter()
        .find(|p| p.task_id == "task-1")
        .unwrap();
    assert_eq!((review.start, review.end), (630, 675));

    // Nothing lands inside the meeting or lunch.
    for p in out.placements.iter().filter(|p| p.date == monday) {
        assert!(p.end <= 540 || p.start >= 630, "meeting conflict: {p:?}");
        assert!(p.end <= 720 || p.start >= 780, "lunch conflict: {p:?}");
    }
}

/// Recurring occurrences expand first, then each occurrence schedules on its
/// own date.
#[test]
fn test_recurring_task_places_one_block_per_occurrence() {
    // Mon/Wed/Fri standup prep, 30 minutes each.
    let rule = RecurrenceRule::bounded(vec![1, 3, 5], date(2024, 1, 1), date(2024, 1, 31));
    rule.validate().unwrap();

    let monday = date(2024, 1, 8);
    let dates = rule.expand(monday, date(2024, 1, 12), monday, 0, 540 + 30);
    assert_eq!(
        dates,
        vec![monday, date(2024, 1, 10), date(2024, 1, 12)]
    );

    let config = WorkdayConfig::default();
    let mut placements = Vec::new();
    for (i, occurrence) in dates.iter().enumerate() {
        let task = TaskCandidate::new(format!("standup-{i}"), "standup prep")
            .with_duration(30)
            .with_priority(Priority::High);
        let out = schedule(&[task], *occurrence, *occurrence, monday, 0, &config, &[]).unwrap();
        placements.extend(out.placements);
    }

    assert_eq!(placements.len(), 3);
    for (p, d) in placements.iter().zip(&dates) {
        assert_eq!(p.date, *d);
        assert_eq!(p.start, 540);
    }
}

/// A placement that runs past midnight splits into two segments whose
/// durations reconcile exactly.
#[test]
fn test_cross_day_split_round_trip() {
    let night = date(2024, 1, 8);
    let (first, second) = split_cross_day(night, 1350, 60); // 22:30 -> 01:00

    assert_eq!(first.date, night);
    assert_eq!(second.date, date(2024, 1, 9));
    assert_eq!(
        first.minutes() + second.minutes(),
        duration_minutes(1350, 60)
    );

    // The two segments read back as busy intervals for conflict detection.
    let busy = vec![
        BusyInterval {
            date: first.date,
            start: first.start,
            end: first.end,
        },
        BusyInterval {
            date: second.date,
            start: second.start,
            end: second.end,
        },
    ];

    // Nothing fits in the closed 22:30-24:00 stretch; a morning task on the
    // next day must start after 01:00.
    let mut config = WorkdayConfig::default();
    config.weekday.start = 0;
    config.weekday.end = 17 * 60;

    let task = TaskCandidate::new("early", "early run").with_duration(60);
    let out = schedule(
        &[task],
        second.date,
        second.date,
        second.date,
        0,
        &config,
        &busy,
    )
    .unwrap();
    assert_eq!(out.placements[0].start, 60);
}

/// Overlap grouping is presentation-side: scheduler output for one day never
/// overlaps, so only externally-synced simultaneous items form groups.
#[test]
fn test_overlap_groups_only_external_conflicts() {
    use timeblock_core::ScheduledItem;

    let monday = date(2024, 1, 8);
    let tasks = vec![
        TaskCandidate::new("a", "a").with_duration(60),
        TaskCandidate::new("b", "b").with_duration(60),
    ];
    let out = schedule(
        &tasks,
        monday,
        monday,
        monday,
        0,
        &WorkdayConfig::default(),
        &[],
    )
    .unwrap();

    let mut items: Vec<ScheduledItem> = out
        .placements
        .iter()
        .map(|p| ScheduledItem {
            id: p.task_id.clone(),
            start: p.start,
            end: p.end,
        })
        .collect();
    assert!(group_overlaps(&items).is_empty());

    // An externally synced call on top of the first block creates one group.
    items.push(ScheduledItem {
        id: "external-call".to_string(),
        start: 550,
        end: 590,
    });
    let groups = group_overlaps(&items);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].items.len(), 2);
}
