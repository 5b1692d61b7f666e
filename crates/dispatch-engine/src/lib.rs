//! # dispatch-engine
//!
//! Deterministic conflict detection and day-window math for technician
//! scheduling boards.
//!
//! Every operation is a pure function over the job set the caller passes in:
//! nothing is cached between calls and nothing is mutated, so validation of
//! simultaneous drag operations needs no coordination.
//!
//! ## Modules
//!
//! - [`interval`] — Half-open `[start, end)` intervals, validated at construction
//! - [`job`] — `ScheduledJob`, its closed `JobStatus` enum, `Technician`
//! - [`conflict`] — Find jobs that overlap a proposed placement
//! - [`day_window`] — Time-zone-explicit day boundaries, day filtering, ordering
//! - [`index`] — Sorted snapshot answering conflict queries without a full scan
//! - [`freebusy`] — Free time slots within a window
//! - [`snap`] — Grid snapping for drag-and-drop moves
//! - [`recurrence`] — Expand recurring jobs into occurrences (RRULE)
//! - [`config`] — Board settings (time zone, snap grid)
//! - [`error`] — Error types
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use dispatch_engine::{find_conflicts, JobStatus, ScheduledJob, TimeInterval};
//!
//! let at = |h| Utc.with_ymd_and_hms(2026, 3, 16, h, 0, 0).unwrap();
//! let jobs = vec![ScheduledJob::new(
//!     "j1",
//!     "tech-7",
//!     JobStatus::Scheduled,
//!     TimeInterval::new(at(9), at(10)).unwrap(),
//! )];
//!
//! // Back-to-back is fine.
//! let next = TimeInterval::new(at(10), at(11)).unwrap();
//! assert!(find_conflicts(&next, &jobs, None).is_empty());
//!
//! // Overlap is reported.
//! let overlapping = TimeInterval::new(at(9), at(12)).unwrap();
//! assert_eq!(find_conflicts(&overlapping, &jobs, None)[0].id, "j1");
//! ```

pub mod config;
pub mod conflict;
pub mod day_window;
pub mod error;
pub mod freebusy;
pub mod index;
pub mod interval;
pub mod job;
pub mod recurrence;
pub mod snap;

pub use config::BoardConfig;
pub use conflict::{
    conflict_details, find_conflicts, find_conflicts_in_range, has_conflict,
    has_conflict_in_range, Conflict,
};
pub use day_window::{
    day_window, end_of_day, filter_jobs_for_date, filter_jobs_for_day, group_jobs_by_day,
    parse_timezone, sort_jobs_by_start_time, start_of_day,
};
pub use error::DispatchError;
pub use freebusy::{find_first_free_slot, find_free_slots, FreeSlot};
pub use index::ScheduleIndex;
pub use interval::TimeInterval;
pub use job::{JobStatus, ScheduledJob, Technician};
pub use recurrence::{expand_recurring_job, RecurringJob};
pub use snap::{move_interval, snap_minutes, SnapConfig};
