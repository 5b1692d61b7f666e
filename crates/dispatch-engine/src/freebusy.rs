//! Compute a technician's free time within a window.
//!
//! Sorts the non-cancelled jobs by start time, merges overlapping busy periods,
//! then computes the gaps between merged periods within the window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;
use crate::job::ScheduledJob;

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl FreeSlot {
    fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        FreeSlot {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }
}

/// Merge overlapping or adjacent busy periods, clipped to the given window.
///
/// Returns a sorted, non-overlapping list of intervals.
pub fn merge_busy_periods(jobs: &[ScheduledJob], window: &TimeInterval) -> Vec<TimeInterval> {
    let mut intervals: Vec<TimeInterval> = jobs
        .iter()
        .filter(|job| job.status.occupies_slot())
        .filter_map(|job| job.interval.intersection(window))
        .collect();

    intervals.sort_by_key(|i| (i.start(), i.end()));

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start() <= last.end() {
                // Overlapping or adjacent: extend the current block.
                *last = TimeInterval::from_ordered(last.start(), last.end().max(interval.end()));
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Find free time slots within `window`, given a technician's jobs.
///
/// Cancelled jobs do not occupy time. Returns free slots sorted by start time.
pub fn find_free_slots(jobs: &[ScheduledJob], window: &TimeInterval) -> Vec<FreeSlot> {
    let mut free_slots = Vec::new();
    let mut cursor = window.start();

    for busy in merge_busy_periods(jobs, window) {
        if cursor < busy.start() {
            free_slots.push(FreeSlot::new(cursor, busy.start()));
        }
        cursor = cursor.max(busy.end());
    }

    if cursor < window.end() {
        free_slots.push(FreeSlot::new(cursor, window.end()));
    }

    free_slots
}

/// Find the first free slot of at least `min_duration_minutes` within the window.
pub fn find_first_free_slot(
    jobs: &[ScheduledJob],
    window: &TimeInterval,
    min_duration_minutes: i64,
) -> Option<FreeSlot> {
    find_free_slots(jobs, window)
        .into_iter()
        .find(|slot| slot.duration_minutes >= min_duration_minutes)
}
