//! Time-slot snapping for drag-and-drop moves on the board.
//!
//! A drag is measured in pixels along the timeline, converted to minutes,
//! snapped to the grid, and applied to the job's interval. The drag preview and
//! the final drop both go through [`move_interval`], so they cannot disagree.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::interval::TimeInterval;

pub const DEFAULT_SNAP_INTERVAL_MINUTES: i64 = 15;
pub const DEFAULT_HOUR_WIDTH_PX: f64 = 80.0;

/// Grid settings for the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Grid size in minutes.
    pub snap_interval_minutes: i64,
    /// Width of one hour on the timeline, in pixels.
    pub hour_width_px: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snap_interval_minutes: DEFAULT_SNAP_INTERVAL_MINUTES,
            hour_width_px: DEFAULT_HOUR_WIDTH_PX,
        }
    }
}

impl SnapConfig {
    pub fn validate(&self) -> Result<()> {
        if self.snap_interval_minutes <= 0 {
            return Err(DispatchError::InvalidSnapInterval(self.snap_interval_minutes));
        }
        if !(self.hour_width_px.is_finite() && self.hour_width_px > 0.0) {
            return Err(DispatchError::Config(format!(
                "hour width must be a positive number of pixels, got {}",
                self.hour_width_px
            )));
        }
        Ok(())
    }
}

/// Round `raw_minutes` to the nearest multiple of `interval_minutes`.
///
/// Exact halves round toward positive infinity, so a 30-minute grid sends 15 to
/// 30 and -15 to 0. Negative deltas (dragging left) snap symmetrically
/// otherwise: -23 on a 15-minute grid becomes -30.
///
/// # Errors
/// Returns `DispatchError::InvalidSnapInterval` if `interval_minutes <= 0`, and
/// `DispatchError::ShiftOutOfRange` if the snapped value does not fit an `i64`.
pub fn snap_minutes(raw_minutes: i64, interval_minutes: i64) -> Result<i64> {
    if interval_minutes <= 0 {
        return Err(DispatchError::InvalidSnapInterval(interval_minutes));
    }
    // floor(raw / interval + 1/2), kept in integers. i128 cannot overflow here.
    let raw = i128::from(raw_minutes);
    let interval = i128::from(interval_minutes);
    let steps = (2 * raw + interval).div_euclid(2 * interval);
    i64::try_from(steps * interval).map_err(|_| {
        DispatchError::ShiftOutOfRange(format!(
            "{} minutes on a {}-minute grid",
            raw_minutes, interval_minutes
        ))
    })
}

/// Convert a horizontal drag distance to whole minutes.
///
/// # Errors
/// Returns `DispatchError::ShiftOutOfRange` when the distance is not finite or
/// does not fit an `i64` number of minutes.
pub fn pixels_to_minutes(delta_px: f64, hour_width_px: f64) -> Result<i64> {
    let minutes = (delta_px / hour_width_px * 60.0).round();
    if !(i64::MIN as f64..i64::MAX as f64).contains(&minutes) {
        return Err(DispatchError::ShiftOutOfRange(format!(
            "{} px at {} px per hour",
            delta_px, hour_width_px
        )));
    }
    Ok(minutes as i64)
}

/// Move `interval` by `raw_delta_minutes`, snapped to the grid in `config`.
///
/// The duration of the interval is preserved.
///
/// # Errors
/// Fails like [`snap_minutes`], and with `DispatchError::ShiftOutOfRange` when
/// the moved interval would leave the representable time range.
pub fn move_interval(
    interval: &TimeInterval,
    raw_delta_minutes: i64,
    config: &SnapConfig,
) -> Result<TimeInterval> {
    let snapped = snap_minutes(raw_delta_minutes, config.snap_interval_minutes)?;
    Duration::try_minutes(snapped)
        .and_then(|delta| interval.shifted(delta))
        .ok_or_else(|| DispatchError::ShiftOutOfRange(format!("{} minutes", snapped)))
}

/// Move `interval` by a drag of `delta_px` pixels.
pub fn drag_interval(
    interval: &TimeInterval,
    delta_px: f64,
    config: &SnapConfig,
) -> Result<TimeInterval> {
    config.validate()?;
    let raw = pixels_to_minutes(delta_px, config.hour_width_px)?;
    move_interval(interval, raw, config)
}
