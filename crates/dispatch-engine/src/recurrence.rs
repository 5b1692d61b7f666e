//! Recurring jobs -- expands a repeating job into concrete occurrences.
//!
//! Wraps the `rrule` crate (v0.13) and `chrono-tz` so that a job booked "every
//! Tuesday at 14:00 America/Los_Angeles" keeps its wall-clock time across DST
//! transitions. Each occurrence is an ordinary [`ScheduledJob`] pointing back at
//! its template through `parent_job_id`, ready for conflict checks.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::day_window::parse_timezone;
use crate::error::{DispatchError, Result};
use crate::interval::TimeInterval;
use crate::job::{JobStatus, ScheduledJob};

/// Upper bound on occurrences when neither COUNT nor `count` limits the rule.
pub const MAX_OCCURRENCES: u16 = 500;

/// A job template that repeats on an RFC 5545 rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringJob {
    pub id: String,
    pub technician_id: String,
    /// RRULE body, e.g. `"FREQ=WEEKLY;BYDAY=TU,TH"`.
    pub rrule: String,
    /// Local start of the first occurrence, e.g. `"2026-02-17T14:00:00"`.
    pub dtstart: String,
    pub duration_minutes: u32,
    /// IANA time zone the rule is evaluated in.
    pub timezone: String,
}

/// Expand `job` into scheduled occurrences.
///
/// - `until` -- optional local end boundary (same format as `dtstart`)
/// - `count` -- optional maximum number of occurrences (a COUNT in the rule wins)
///
/// Occurrence ids are `"{id}@{start}"` with the start in RFC 3339 UTC.
///
/// # Errors
/// Returns `DispatchError::InvalidRule` if the rule is empty or unparseable,
/// `DispatchError::InvalidTimezone` for an unknown zone, and
/// `DispatchError::InvalidInterval` when `duration_minutes` is zero.
pub fn expand_recurring_job(
    job: &RecurringJob,
    until: Option<&str>,
    count: Option<u32>,
) -> Result<Vec<ScheduledJob>> {
    if job.rrule.trim().is_empty() {
        return Err(DispatchError::InvalidRule("empty RRULE string".to_string()));
    }

    if count == Some(0) {
        return Ok(Vec::new());
    }

    parse_timezone(&job.timezone)?;

    let rule_text = build_rule_text(job, until, count);
    let rrule_set: RRuleSet = rule_text
        .parse()
        .map_err(|e| DispatchError::InvalidRule(format!("{}", e)))?;

    let limit = count
        .map(|c| u16::try_from(c).unwrap_or(u16::MAX))
        .unwrap_or(MAX_OCCURRENCES);
    let instances = rrule_set.all(limit);
    let duration = Duration::minutes(i64::from(job.duration_minutes));

    let mut occurrences = instances
        .dates
        .into_iter()
        .map(|dt| -> Result<ScheduledJob> {
            let start: DateTime<Utc> = dt.with_timezone(&Utc);
            let interval = TimeInterval::new(start, start + duration)?;
            Ok(ScheduledJob {
                id: format!(
                    "{}@{}",
                    job.id,
                    start.to_rfc3339_opts(SecondsFormat::Secs, true)
                ),
                technician_id: job.technician_id.clone(),
                status: JobStatus::Scheduled,
                interval,
                parent_job_id: Some(job.id.clone()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(c) = count {
        occurrences.truncate(c as usize);
    }

    debug!(
        job_id = %job.id,
        occurrences = occurrences.len(),
        limited = instances.limited,
        "expanded recurring job"
    );

    Ok(occurrences)
}

/// Render the iCalendar block the `rrule` crate parses, injecting COUNT and
/// UNTIL when the rule does not already carry them.
fn build_rule_text(job: &RecurringJob, until: Option<&str>, count: Option<u32>) -> String {
    let mut rule = job.rrule.trim().to_string();
    let upper = rule.to_uppercase();

    if let Some(c) = count {
        if !upper.contains("COUNT=") {
            rule = format!("{};COUNT={}", rule, c);
        }
    }

    // UNTIL must share DTSTART's zone: a trailing "Z" for UTC, bare local time otherwise.
    if let Some(until) = until {
        if !upper.contains("UNTIL=") {
            let mut until_ical = until.replace(['-', ':'], "");
            if job.timezone == "UTC" {
                until_ical.push('Z');
            }
            rule = format!("{};UNTIL={}", rule, until_ical);
        }
    }

    format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        job.timezone,
        job.dtstart.replace(['-', ':'], ""),
        rule
    )
}
