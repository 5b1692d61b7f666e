//! Sorted snapshot of a job set for repeated conflict queries.
//!
//! [`ScheduleIndex`] answers the same questions as [`crate::conflict`] with the
//! same overlap rules and result order, but avoids a full scan per query:
//!
//! 1. Jobs are sorted by `(start, id)` once at build time.
//! 2. A binary search drops every job starting at or after `candidate.end`.
//! 3. A running maximum of end times lets the backwards walk stop as soon as no
//!    earlier job can reach past `candidate.start`.
//!
//! The index is immutable. After the underlying schedule changes, build a new
//! one; an existing index (possibly shared behind an `Arc`) keeps answering from
//! its own snapshot and is never observed half-updated.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::interval::TimeInterval;
use crate::job::ScheduledJob;

#[derive(Debug, Clone, Default)]
pub struct ScheduleIndex {
    /// Non-cancelled jobs sorted by `(start, id)`.
    jobs: Vec<ScheduledJob>,
    /// `max_end[i]` is the latest end among `jobs[..=i]`.
    max_end: Vec<DateTime<Utc>>,
}

impl ScheduleIndex {
    /// Snapshot `jobs`, dropping cancelled ones.
    pub fn build(jobs: &[ScheduledJob]) -> Self {
        let mut sorted: Vec<ScheduledJob> = jobs
            .iter()
            .filter(|job| job.status.occupies_slot())
            .cloned()
            .collect();
        sorted.sort_by(|a, b| a.start().cmp(&b.start()).then_with(|| a.id.cmp(&b.id)));

        let max_end = sorted
            .iter()
            .scan(None::<DateTime<Utc>>, |latest, job| {
                let end = latest.map_or(job.end(), |l| l.max(job.end()));
                *latest = Some(end);
                Some(end)
            })
            .collect();

        debug!(
            jobs = sorted.len(),
            skipped = jobs.len() - sorted.len(),
            "built schedule index"
        );

        Self {
            jobs: sorted,
            max_end,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Indexed jobs in `(start, id)` order.
    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    /// Overlapping jobs, walking from the latest start downwards.
    fn overlapping_rev(
        &self,
        candidate: TimeInterval,
    ) -> impl Iterator<Item = &ScheduledJob> + '_ {
        let upper = self.jobs.partition_point(|job| job.start() < candidate.end());

        (0..upper)
            .rev()
            .take_while(move |&i| self.max_end[i] > candidate.start())
            .map(move |i| &self.jobs[i])
            .filter(move |job| job.end() > candidate.start())
    }

    /// Same contract as [`crate::conflict::find_conflicts`].
    pub fn find_conflicts(
        &self,
        candidate: &TimeInterval,
        exclude_job_id: Option<&str>,
    ) -> Vec<&ScheduledJob> {
        let mut hits: Vec<&ScheduledJob> = self
            .overlapping_rev(*candidate)
            .filter(|job| exclude_job_id != Some(job.id.as_str()))
            .collect();
        hits.reverse();
        hits
    }

    /// Same contract as [`crate::conflict::has_conflict`].
    pub fn has_conflict(&self, candidate: &TimeInterval, exclude_job_id: Option<&str>) -> bool {
        self.overlapping_rev(*candidate).any(|job| exclude_job_id != Some(job.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;
    use chrono::TimeZone;

    fn job(id: &str, start_hour: u32, end_hour: u32) -> ScheduledJob {
        let interval = TimeInterval::new(
            Utc.with_ymd_and_hms(2026, 3, 16, start_hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 16, end_hour, 0, 0).unwrap(),
        )
        .unwrap();
        ScheduledJob::new(id, "tech-1", JobStatus::Scheduled, interval)
    }

    #[test]
    fn running_max_end_tracks_long_early_jobs() {
        // j1 spans the whole morning, so the walk must not stop at j2.
        let index =
            ScheduleIndex::build(&[job("j1", 6, 12), job("j2", 8, 9), job("j3", 10, 11)]);
        assert_eq!(index.max_end.len(), 3);
        assert_eq!(index.max_end[1], index.max_end[0]);

        let candidate = TimeInterval::new(
            Utc.with_ymd_and_hms(2026, 3, 16, 11, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 16, 13, 0, 0).unwrap(),
        )
        .unwrap();
        let ids: Vec<&str> = index
            .find_conflicts(&candidate, None)
            .iter()
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(ids, vec!["j1"]);
    }

    #[test]
    fn index_is_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScheduleIndex>();

        let index = ScheduleIndex::build(&[job("j1", 8, 10), job("j2", 9, 11)]);
        let candidate = TimeInterval::new(
            Utc.with_ymd_and_hms(2026, 3, 16, 9, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 16, 9, 45, 0).unwrap(),
        )
        .unwrap();

        let counts: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| index.find_conflicts(&candidate, None).len()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(counts, vec![2; 4]);
    }
}
