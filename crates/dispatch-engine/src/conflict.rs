//! Detect jobs that collide with a proposed placement.
//!
//! A candidate interval is checked against one technician's job set with a
//! linear scan. Cancelled jobs and the job being moved (`exclude_job_id`) are
//! skipped. Adjacent jobs (where one ends exactly when another starts) are NOT
//! conflicts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::day_window::sort_jobs_by_start_time;
use crate::error::Result;
use crate::interval::TimeInterval;
use crate::job::ScheduledJob;

/// A conflicting job together with the window it shares with the candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict<'a> {
    pub job: &'a ScheduledJob,
    pub overlap: TimeInterval,
    pub overlap_minutes: i64,
}

/// The single predicate behind [`find_conflicts`] and [`has_conflict`].
fn blocks(job: &ScheduledJob, candidate: &TimeInterval, exclude_job_id: Option<&str>) -> bool {
    job.status.occupies_slot()
        && exclude_job_id != Some(job.id.as_str())
        && candidate.overlaps(&job.interval)
}

/// Find every job in `jobs` whose interval overlaps `candidate`.
///
/// Two intervals overlap when `a.start < b.end && b.start < a.end`. Cancelled
/// jobs never conflict, and the job named by `exclude_job_id` is ignored so a
/// job being rescheduled is not compared against its own prior slot.
///
/// The result is ordered by start time, ties broken by job id. An empty result
/// means the slot is clear.
pub fn find_conflicts<'a>(
    candidate: &TimeInterval,
    jobs: &'a [ScheduledJob],
    exclude_job_id: Option<&str>,
) -> Vec<&'a ScheduledJob> {
    sort_jobs_by_start_time(jobs.iter().filter(|job| blocks(job, candidate, exclude_job_id)))
}

/// Whether any job blocks `candidate`. Stops at the first hit.
pub fn has_conflict(
    candidate: &TimeInterval,
    jobs: &[ScheduledJob],
    exclude_job_id: Option<&str>,
) -> bool {
    jobs.iter().any(|job| blocks(job, candidate, exclude_job_id))
}

/// [`find_conflicts`] for raw bounds.
///
/// # Errors
/// Returns `DispatchError::InvalidInterval` when `end <= start`, before any job
/// is examined.
pub fn find_conflicts_in_range<'a>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    jobs: &'a [ScheduledJob],
    exclude_job_id: Option<&str>,
) -> Result<Vec<&'a ScheduledJob>> {
    let candidate = TimeInterval::new(start, end)?;
    Ok(find_conflicts(&candidate, jobs, exclude_job_id))
}

/// [`has_conflict`] for raw bounds.
///
/// # Errors
/// Returns `DispatchError::InvalidInterval` when `end <= start`.
pub fn has_conflict_in_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    jobs: &[ScheduledJob],
    exclude_job_id: Option<&str>,
) -> Result<bool> {
    let candidate = TimeInterval::new(start, end)?;
    Ok(has_conflict(&candidate, jobs, exclude_job_id))
}

/// Like [`find_conflicts`], but also reports how much of each job overlaps.
///
/// The overlap is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn conflict_details<'a>(
    candidate: &TimeInterval,
    jobs: &'a [ScheduledJob],
    exclude_job_id: Option<&str>,
) -> Vec<Conflict<'a>> {
    find_conflicts(candidate, jobs, exclude_job_id)
        .into_iter()
        .filter_map(|job| {
            let overlap = candidate.intersection(&job.interval)?;
            Some(Conflict {
                job,
                overlap,
                overlap_minutes: overlap.duration().num_minutes(),
            })
        })
        .collect()
}
