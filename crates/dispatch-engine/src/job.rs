//! Scheduled jobs, their status, and technicians.
//!
//! Jobs travel as flat JSON records:
//!
//! ```json
//! {"id":"j1","technician_id":"t1","status":"in-progress",
//!  "start":"2026-03-16T09:00:00Z","end":"2026-03-16T10:00:00Z"}
//! ```
//!
//! Both the interval and the status are validated on the way in. An unknown
//! status is rejected rather than treated as active.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conflict;
use crate::error::{DispatchError, Result};
use crate::interval::TimeInterval;

/// Lifecycle status of a job on the board.
///
/// Only [`JobStatus::Cancelled`] frees the technician's time; every other status
/// occupies its slot for conflict purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    Scheduled,
    Dispatched,
    Arrived,
    InProgress,
    Closed,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::Dispatched => "dispatched",
            JobStatus::Arrived => "arrived",
            JobStatus::InProgress => "in-progress",
            JobStatus::Closed => "closed",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a job in this status blocks its time slot.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, JobStatus::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(JobStatus::Scheduled),
            "dispatched" => Ok(JobStatus::Dispatched),
            "arrived" => Ok(JobStatus::Arrived),
            "in-progress" => Ok(JobStatus::InProgress),
            "closed" => Ok(JobStatus::Closed),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(DispatchError::UnknownStatus(other.to_string())),
        }
    }
}

/// A job occupying a technician's time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JobRecord", into = "JobRecord")]
pub struct ScheduledJob {
    pub id: String,
    pub technician_id: String,
    pub status: JobStatus,
    pub interval: TimeInterval,
    /// Set on occurrences expanded from a recurring job.
    pub parent_job_id: Option<String>,
}

/// Wire shape of a [`ScheduledJob`].
#[derive(Serialize, Deserialize)]
struct JobRecord {
    id: String,
    technician_id: String,
    status: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_job_id: Option<String>,
}

impl TryFrom<JobRecord> for ScheduledJob {
    type Error = DispatchError;

    fn try_from(record: JobRecord) -> Result<Self> {
        Ok(ScheduledJob {
            status: record.status.parse()?,
            interval: TimeInterval::new(record.start, record.end)?,
            id: record.id,
            technician_id: record.technician_id,
            parent_job_id: record.parent_job_id,
        })
    }
}

impl From<ScheduledJob> for JobRecord {
    fn from(job: ScheduledJob) -> Self {
        JobRecord {
            id: job.id,
            technician_id: job.technician_id,
            status: job.status.as_str().to_string(),
            start: job.interval.start(),
            end: job.interval.end(),
            parent_job_id: job.parent_job_id,
        }
    }
}

impl ScheduledJob {
    pub fn new(
        id: impl Into<String>,
        technician_id: impl Into<String>,
        status: JobStatus,
        interval: TimeInterval,
    ) -> Self {
        Self {
            id: id.into(),
            technician_id: technician_id.into(),
            status,
            interval,
            parent_job_id: None,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.interval.end()
    }

    /// A copy of this job placed at `interval`.
    pub fn rescheduled(&self, interval: TimeInterval) -> ScheduledJob {
        ScheduledJob {
            interval,
            ..self.clone()
        }
    }

    /// A copy of this job assigned to another technician.
    pub fn reassigned(&self, technician_id: impl Into<String>) -> ScheduledJob {
        ScheduledJob {
            technician_id: technician_id.into(),
            ..self.clone()
        }
    }
}

/// A technician and the job set the caller fetched for them.
///
/// The job list is owned by the caller's persistence layer; every query reads
/// it as-is at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    #[serde(default)]
    pub jobs: Vec<ScheduledJob>,
}

impl Technician {
    pub fn new(id: impl Into<String>, jobs: Vec<ScheduledJob>) -> Self {
        Self {
            id: id.into(),
            jobs,
        }
    }

    /// Jobs that would collide with placing `candidate` on this technician.
    pub fn conflicts_with(
        &self,
        candidate: &TimeInterval,
        exclude_job_id: Option<&str>,
    ) -> Vec<&ScheduledJob> {
        conflict::find_conflicts(candidate, &self.jobs, exclude_job_id)
    }

    pub fn is_free(&self, candidate: &TimeInterval, exclude_job_id: Option<&str>) -> bool {
        !conflict::has_conflict(candidate, &self.jobs, exclude_job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_text() {
        for status in [
            JobStatus::Scheduled,
            JobStatus::Dispatched,
            JobStatus::Arrived,
            JobStatus::InProgress,
            JobStatus::Closed,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(
            "on-hold".parse::<JobStatus>(),
            Err(DispatchError::UnknownStatus("on-hold".to_string()))
        );
    }

    #[test]
    fn only_cancelled_frees_the_slot() {
        assert!(!JobStatus::Cancelled.occupies_slot());
        assert!(JobStatus::Completed.occupies_slot());
        assert!(JobStatus::InProgress.occupies_slot());
    }
}
