//! Time log validation
//!
//! Checks the time logs of one day against each other. An open-ended log is
//! only valid as the sole log of its day, and no two logs may overlap.
//! Touching logs (one ends exactly when the next starts) are allowed.

use chrono::NaiveTime;
use thiserror::Error;

use crate::models::{CalendarEntryType, TimeLog};

/// Raised when time log validation or editing fails
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeLogError {
    /// A single log is inconsistent (range, pause, open end)
    #[error("{0}")]
    Invalid(String),

    /// An open-ended log shares its day with other logs
    #[error(
        "Multiple open-ended time logs detected. Please set an end time for the log \
         starting at {first} or {second}"
    )]
    MultipleOpenEnded { first: String, second: String },

    /// Two logs of the day overlap
    #[error("Time logs overlap: {left} overlaps with {right}")]
    Overlap { left: String, right: String },

    /// Log index does not address an existing log
    #[error("{0}")]
    Index(String),

    /// Logs can only be attached to work entries
    #[error("Cannot add time log to {0} entry. Only work entries accept time logs.")]
    NotWorkEntry(CalendarEntryType),

    /// Adds the failed operation in front of the underlying error
    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<TimeLogError>,
    },
}

impl TimeLogError {
    /// Wrap the error with the name of the failed operation
    pub fn context(self, context: &'static str) -> Self {
        TimeLogError::Context {
            context,
            source: Box::new(self),
        }
    }
}

/// A closed time interval within one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePair {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimePair {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// Check if two time pairs overlap.
///
/// Intervals that only touch at one boundary do not overlap; an interval
/// that encloses the other (including identical intervals) does.
pub fn is_overlapping(left: TimePair, right: TimePair) -> bool {
    (left.end > right.start && left.end < right.end)
        || (left.start > right.start && left.start < right.end)
        || (left.start <= right.start && left.end >= right.end)
}

fn start_of(log: &TimeLog) -> String {
    log.start.format("%H:%M").to_string()
}

fn describe(start: NaiveTime, end: NaiveTime) -> String {
    format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
}

/// Validate the logs of one day and sort them by start time.
///
/// - Every log must be valid on its own
/// - An open-ended log must be the only log of the day
/// - No two logs may overlap
///
/// Pairs are checked in start order; the first failing pair is reported.
pub fn validate_time_logs(logs: &mut [TimeLog]) -> Result<(), TimeLogError> {
    for log in logs.iter() {
        log.validate()?;
    }

    if logs.len() < 2 {
        return Ok(());
    }

    logs.sort_by_key(|log| log.start);

    for (index, left) in logs.iter().enumerate() {
        for right in &logs[index + 1..] {
            let (Some(left_end), Some(right_end)) = (left.end, right.end) else {
                return Err(TimeLogError::MultipleOpenEnded {
                    first: start_of(left),
                    second: start_of(right),
                });
            };

            let left_pair = TimePair::new(left.start, left_end);
            let right_pair = TimePair::new(right.start, right_end);
            if is_overlapping(left_pair, right_pair) {
                return Err(TimeLogError::Overlap {
                    left: describe(left.start, left_end),
                    right: describe(right.start, right_end),
                });
            }
        }
    }

    Ok(())
}
