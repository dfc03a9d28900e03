//! Time log editing
//!
//! Adds, updates and removes the logs of a calendar entry. Every mutation
//! re-validates the complete set of logs for the day; a failed mutation
//! leaves the entry untouched.

use std::collections::HashSet;

use chrono::{Duration, NaiveTime};
use tracing::info;

use crate::models::{CalendarEntry, TimeLog, TimeLogType};
use crate::time_log::{validate_time_logs, TimeLogError};

/// Partial update of a time log. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeLogPatch {
    pub log_type: Option<TimeLogType>,
    pub start: Option<NaiveTime>,
    /// `Some(None)` clears the end time (open-ended log)
    pub end: Option<Option<NaiveTime>>,
    pub pause: Option<Duration>,
}

impl TimeLogPatch {
    /// Patch that replaces every field with the values of `log`
    pub fn from_log(log: &TimeLog) -> Self {
        Self {
            log_type: Some(log.log_type),
            start: Some(log.start),
            end: Some(log.end),
            pause: Some(log.pause),
        }
    }

    fn apply(&self, log: &mut TimeLog) {
        if let Some(log_type) = self.log_type {
            log.log_type = log_type;
        }
        if let Some(start) = self.start {
            log.start = start;
        }
        if let Some(end) = self.end {
            log.end = end;
        }
        if let Some(pause) = self.pause {
            log.pause = pause;
        }
    }
}

fn validate_index(entry: &CalendarEntry, index: usize) -> Result<(), TimeLogError> {
    if entry.logs.is_empty() {
        return Err(TimeLogError::Index(format!(
            "No time logs found for {}. Cannot access index {}.",
            entry.day, index
        )));
    }

    if index >= entry.logs.len() {
        return Err(TimeLogError::Index(format!(
            "Invalid log index {} - only {} logs exist for {}.",
            index,
            entry.logs.len(),
            entry.day
        )));
    }

    Ok(())
}

/// Add a new log to a work entry
pub fn add_time_log(
    entry: &mut CalendarEntry,
    log_type: TimeLogType,
    start: NaiveTime,
    end: Option<NaiveTime>,
    pause: Duration,
) -> Result<(), TimeLogError> {
    if !entry.is_work() {
        return Err(TimeLogError::NotWorkEntry(entry.entry_type));
    }

    let log = TimeLog::new(log_type, start, end, pause)
        .map_err(|e| e.context("Invalid time log data"))?;

    let mut logs = entry.logs.clone();
    logs.push(log.clone());
    validate_time_logs(&mut logs).map_err(|e| e.context("Invalid time log data"))?;

    entry.logs = logs;
    info!("Added time log to {}: {}", entry.day, log);
    Ok(())
}

/// Update the log at `index` with the fields set in `patch`
pub fn update_time_log(
    entry: &mut CalendarEntry,
    index: usize,
    patch: &TimeLogPatch,
) -> Result<(), TimeLogError> {
    validate_index(entry, index)?;

    let mut logs = entry.logs.clone();
    patch.apply(&mut logs[index]);
    let updated = logs[index].clone();

    validate_time_logs(&mut logs).map_err(|e| e.context("Invalid time log update"))?;

    entry.logs = logs;
    info!("Updated time log [{}] for {}: {}", index, entry.day, updated);
    Ok(())
}

/// Remove the log at `index`
pub fn remove_time_log(entry: &mut CalendarEntry, index: usize) -> Result<(), TimeLogError> {
    validate_index(entry, index)?;

    let mut logs = entry.logs.clone();
    let removed = logs.remove(index);
    validate_time_logs(&mut logs).map_err(|e| e.context("Cannot remove time log"))?;

    entry.logs = logs;
    info!("Removed time log [{}] from {}: {}", index, entry.day, removed);
    Ok(())
}

/// Replace all logs of an entry with `logs`.
///
/// Ids of `logs` are kept only when they belong to a current log of the
/// entry and have not been claimed by an earlier log of the list. Every
/// other log is stored as a new log. The complete set is validated once.
pub fn replace_time_logs(entry: &mut CalendarEntry, logs: &[TimeLog]) -> Result<(), TimeLogError> {
    if !entry.is_work() && !logs.is_empty() {
        return Err(TimeLogError::NotWorkEntry(entry.entry_type));
    }

    let known: HashSet<i64> = entry.logs.iter().filter_map(|log| log.id).collect();
    let mut claimed: HashSet<i64> = HashSet::new();
    let mut replaced: Vec<TimeLog> = logs
        .iter()
        .map(|log| TimeLog {
            id: log.id.filter(|id| known.contains(id) && claimed.insert(*id)),
            ..log.clone()
        })
        .collect();
    validate_time_logs(&mut replaced).map_err(|e| e.context("Invalid time log update"))?;

    let removed = entry
        .logs
        .iter()
        .filter(|log| log.id.map_or(true, |id| !claimed.contains(&id)))
        .count();
    info!(
        "Replaced time logs of {}: {} kept, {} added, {} removed",
        entry.day,
        claimed.len(),
        replaced.len() - claimed.len(),
        removed
    );
    entry.logs = replaced;
    Ok(())
}
