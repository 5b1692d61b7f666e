//! Calendar-day boundaries and job ordering for the board.
//!
//! Day boundaries are always computed in an explicit IANA time zone. There is no
//! fallback to the host's local time.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{DispatchError, Result};
use crate::interval::TimeInterval;
use crate::job::ScheduledJob;

/// Step used to walk past a DST gap that swallows local midnight.
const GAP_STEP_MINUTES: i64 = 1;

/// Parse an IANA time zone name (e.g. `"America/Chicago"`).
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse().map_err(|_| DispatchError::InvalidTimezone(name.to_string()))
}

/// The local calendar date of `ts` in `tz`.
pub fn local_date(ts: DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// Earliest instant at or after the local time `from` that exists in `tz`.
fn first_existing(from: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    let mut local = from;
    loop {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return Some(dt.with_timezone(&Utc));
        }
        local = local.checked_add_signed(Duration::minutes(GAP_STEP_MINUTES))?;
    }
}

/// First instant of `date` in `tz`.
///
/// Normally local midnight. Where a DST transition skips midnight (e.g.
/// `America/Havana`), this is the first local time that exists on that date.
/// On an ambiguous midnight the earlier instant wins. `None` when the zone
/// skipped the whole date (`Pacific/Apia`, 2011-12-30).
fn first_instant(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    first_existing(date.and_time(NaiveTime::MIN), tz)
        .filter(|dt| local_date(*dt, tz) == date)
}

/// First instant of the next local date after `date` that exists in `tz`.
fn first_instant_after(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    date.succ_opt()
        .and_then(|next| first_existing(next.and_time(NaiveTime::MIN), tz))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Start of the calendar day containing `ts` in `tz` (local 00:00:00.000).
pub fn start_of_day(ts: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    // The date of `ts` exists by construction; never report a start after `ts`.
    first_instant(local_date(ts, tz), tz).map_or(ts, |start| start.min(ts))
}

/// Last millisecond of the calendar day containing `ts` in `tz`
/// (local 23:59:59.999 on an ordinary day).
pub fn end_of_day(ts: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    first_instant_after(local_date(ts, tz), tz) - Duration::milliseconds(1)
}

/// The half-open window `[start_of_day, start of next day)` for `date` in `tz`.
///
/// Its length is 23 or 25 hours on DST transition days. Returns `None` for a
/// date the zone skipped entirely.
pub fn date_window(date: NaiveDate, tz: Tz) -> Option<TimeInterval> {
    let start = first_instant(date, tz)?;
    TimeInterval::new(start, first_instant_after(date, tz)).ok()
}

/// The window of the day containing `ts`. Unlike [`date_window`] this always
/// exists, since `ts` itself lies on that day.
pub fn day_window(ts: DateTime<Utc>, tz: Tz) -> TimeInterval {
    TimeInterval::from_ordered(
        start_of_day(ts, tz),
        first_instant_after(local_date(ts, tz), tz),
    )
}

/// Jobs whose interval intersects the local calendar `date`, in input order.
///
/// A job ending exactly at the day's first instant belongs to the previous day
/// only; a job starting exactly at it is included. A date the zone skipped has
/// no jobs.
pub fn filter_jobs_for_date(
    jobs: &[ScheduledJob],
    date: NaiveDate,
    tz: Tz,
) -> Vec<&ScheduledJob> {
    match date_window(date, tz) {
        Some(window) => jobs.iter().filter(|job| job.interval.overlaps(&window)).collect(),
        None => {
            debug!(%date, timezone = %tz, "date does not exist in zone");
            Vec::new()
        }
    }
}

/// Jobs whose interval intersects `[start_of_day(day), end_of_day(day)]`.
pub fn filter_jobs_for_day(
    jobs: &[ScheduledJob],
    day: DateTime<Utc>,
    tz: Tz,
) -> Vec<&ScheduledJob> {
    filter_jobs_for_date(jobs, local_date(day, tz), tz)
}

/// Stable sort ascending by start time, ties broken by job id.
pub fn sort_jobs_by_start_time<'a, I>(jobs: I) -> Vec<&'a ScheduledJob>
where
    I: IntoIterator<Item = &'a ScheduledJob>,
{
    let mut sorted: Vec<&ScheduledJob> = jobs.into_iter().collect();
    sorted.sort_by(|a, b| a.start().cmp(&b.start()).then_with(|| a.id.cmp(&b.id)));
    sorted
}

/// Bucket jobs by the local date of their start, each bucket sorted by
/// [`sort_jobs_by_start_time`].
pub fn group_jobs_by_day(
    jobs: &[ScheduledJob],
    tz: Tz,
) -> BTreeMap<NaiveDate, Vec<&ScheduledJob>> {
    let mut days: BTreeMap<NaiveDate, Vec<&ScheduledJob>> = BTreeMap::new();
    for job in jobs {
        days.entry(local_date(job.start(), tz)).or_default().push(job);
    }
    days.into_iter()
        .map(|(date, bucket)| (date, sort_jobs_by_start_time(bucket)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_midnight_resolves_to_first_existing_instant() {
        // Havana springs forward at 00:00 -> 01:00 on 2026-03-08.
        let tz: Tz = "America/Havana".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();

        let start = first_instant(date, tz).unwrap();
        let local = start.with_timezone(&tz);

        assert_eq!(local.date_naive(), date);
        assert_eq!(local.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
    }

    #[test]
    fn date_skipped_by_the_zone_has_no_window() {
        // Samoa jumped from the end of 2011-12-29 straight to 2011-12-31.
        let tz: Tz = "Pacific/Apia".parse().unwrap();
        let skipped = NaiveDate::from_ymd_opt(2011, 12, 30).unwrap();
        let before = NaiveDate::from_ymd_opt(2011, 12, 29).unwrap();
        let after = NaiveDate::from_ymd_opt(2011, 12, 31).unwrap();

        assert_eq!(first_instant(skipped, tz), None);
        assert_eq!(date_window(skipped, tz), None);

        let job = ScheduledJob::new(
            "j1",
            "tech-1",
            crate::job::JobStatus::Scheduled,
            TimeInterval::new(
                Utc.with_ymd_and_hms(2011, 12, 29, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2012, 1, 2, 0, 0, 0).unwrap(),
            )
            .unwrap(),
        );
        assert!(filter_jobs_for_date(std::slice::from_ref(&job), skipped, tz).is_empty());

        // The day before runs straight into the day after.
        let last = date_window(before, tz).unwrap();
        let next = date_window(after, tz).unwrap();
        assert_eq!(last.end(), next.start());
        assert_eq!(last.duration(), Duration::hours(24));
        assert_eq!(first_instant_after(before, tz), next.start());
    }
}
