//! Error types for dispatch-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// An interval whose end is not strictly after its start.
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Unknown job status: {0}")]
    UnknownStatus(String),

    #[error("Invalid snap interval: {0} minutes (must be positive)")]
    InvalidSnapInterval(i64),

    /// A move or snap whose result does not fit the supported time range.
    #[error("Shift out of range: {0}")]
    ShiftOutOfRange(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid board configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
