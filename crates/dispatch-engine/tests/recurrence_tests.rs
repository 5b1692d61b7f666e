//! Tests for expanding recurring jobs into scheduled occurrences.

use chrono::{TimeZone, Utc};
use dispatch_engine::recurrence::{expand_recurring_job, RecurringJob, MAX_OCCURRENCES};
use dispatch_engine::{find_conflicts, DispatchError, JobStatus, TimeInterval};

fn weekly_maintenance(rrule: &str, timezone: &str) -> RecurringJob {
    RecurringJob {
        id: "maint".to_string(),
        technician_id: "tech-4".to_string(),
        rrule: rrule.to_string(),
        dtstart: "2026-02-17T14:00:00".to_string(),
        duration_minutes: 90,
        timezone: timezone.to_string(),
    }
}

#[test]
fn weekly_occurrences_keep_wall_clock_across_dst() {
    // Tuesdays 14:00 Los Angeles; DST starts 2026-03-08.
    let job = weekly_maintenance("FREQ=WEEKLY;BYDAY=TU", "America/Los_Angeles");

    let occurrences = expand_recurring_job(&job, None, Some(4)).unwrap();

    assert_eq!(occurrences.len(), 4);
    // Feb 17, Feb 24, Mar 3 are PST (UTC-8); Mar 10 is PDT (UTC-7).
    assert_eq!(
        occurrences[0].start(),
        Utc.with_ymd_and_hms(2026, 2, 17, 22, 0, 0).unwrap()
    );
    assert_eq!(
        occurrences[2].start(),
        Utc.with_ymd_and_hms(2026, 3, 3, 22, 0, 0).unwrap()
    );
    assert_eq!(
        occurrences[3].start(),
        Utc.with_ymd_and_hms(2026, 3, 10, 21, 0, 0).unwrap()
    );
    assert_eq!(
        occurrences[3].end(),
        Utc.with_ymd_and_hms(2026, 3, 10, 22, 30, 0).unwrap()
    );
}

#[test]
fn occurrences_reference_their_template() {
    let job = weekly_maintenance("FREQ=WEEKLY", "UTC");

    let occurrences = expand_recurring_job(&job, None, Some(2)).unwrap();

    assert_eq!(occurrences[0].id, "maint@2026-02-17T14:00:00Z");
    assert_eq!(occurrences[1].id, "maint@2026-02-24T14:00:00Z");
    for occurrence in &occurrences {
        assert_eq!(occurrence.parent_job_id.as_deref(), Some("maint"));
        assert_eq!(occurrence.technician_id, "tech-4");
        assert_eq!(occurrence.status, JobStatus::Scheduled);
    }
}

#[test]
fn until_bounds_expansion() {
    let job = weekly_maintenance("FREQ=DAILY", "UTC");

    let occurrences = expand_recurring_job(&job, Some("2026-02-20T23:59:59"), None).unwrap();

    // Feb 17, 18, 19, 20
    assert_eq!(occurrences.len(), 4);
}

#[test]
fn unbounded_rule_is_capped() {
    let job = weekly_maintenance("FREQ=DAILY", "UTC");

    let occurrences = expand_recurring_job(&job, None, None).unwrap();

    assert_eq!(occurrences.len(), MAX_OCCURRENCES as usize);
}

#[test]
fn zero_count_yields_nothing() {
    let job = weekly_maintenance("FREQ=DAILY", "UTC");

    assert!(expand_recurring_job(&job, None, Some(0)).unwrap().is_empty());
}

#[test]
fn empty_rule_rejected() {
    let job = weekly_maintenance("  ", "UTC");

    assert!(matches!(
        expand_recurring_job(&job, None, Some(3)),
        Err(DispatchError::InvalidRule(_))
    ));
}

#[test]
fn garbage_rule_rejected() {
    let job = weekly_maintenance("FREQ=SOMETIMES", "UTC");

    assert!(matches!(
        expand_recurring_job(&job, None, Some(3)),
        Err(DispatchError::InvalidRule(_))
    ));
}

#[test]
fn unknown_timezone_rejected() {
    let job = weekly_maintenance("FREQ=DAILY", "Mars/Olympus");

    assert_eq!(
        expand_recurring_job(&job, None, Some(3)),
        Err(DispatchError::InvalidTimezone("Mars/Olympus".to_string()))
    );
}

#[test]
fn zero_duration_rejected() {
    let mut job = weekly_maintenance("FREQ=DAILY", "UTC");
    job.duration_minutes = 0;

    assert!(matches!(
        expand_recurring_job(&job, None, Some(3)),
        Err(DispatchError::InvalidInterval { .. })
    ));
}

#[test]
fn occurrences_feed_conflict_detection() {
    let job = weekly_maintenance("FREQ=WEEKLY", "UTC");
    let occurrences = expand_recurring_job(&job, None, Some(3)).unwrap();

    // Second occurrence: 2026-02-24 14:00-15:30 UTC.
    let candidate = TimeInterval::new(
        Utc.with_ymd_and_hms(2026, 2, 24, 15, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 2, 24, 16, 0, 0).unwrap(),
    )
    .unwrap();

    let conflicts = find_conflicts(&candidate, &occurrences, None);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, "maint@2026-02-24T14:00:00Z");
}
