//! Calendar entry and time log models
//!
//! A calendar entry exists at most once per day. Only work entries carry
//! time logs; the durations derived from those logs feed the statistics.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::human_time::{format_duration_hms, serde_duration};
use crate::time_log::TimeLogError;

/// The type of a calendar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarEntryType {
    Work,
    Flextime,
    Vacation,
    Holiday,
    Sick,
}

impl CalendarEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarEntryType::Work => "work",
            CalendarEntryType::Flextime => "flextime",
            CalendarEntryType::Vacation => "vacation",
            CalendarEntryType::Holiday => "holiday",
            CalendarEntryType::Sick => "sick",
        }
    }
}

impl fmt::Display for CalendarEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarEntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(CalendarEntryType::Work),
            "flextime" => Ok(CalendarEntryType::Flextime),
            "vacation" => Ok(CalendarEntryType::Vacation),
            "holiday" => Ok(CalendarEntryType::Holiday),
            "sick" => Ok(CalendarEntryType::Sick),
            other => Err(format!("Unknown calendar entry type: {}", other)),
        }
    }
}

/// The type of a time log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeLogType {
    Work,
    Travel,
}

impl TimeLogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeLogType::Work => "work",
            TimeLogType::Travel => "travel",
        }
    }
}

impl fmt::Display for TimeLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeLogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(TimeLogType::Work),
            "travel" => Ok(TimeLogType::Travel),
            other => Err(format!("Unknown time log type: {}", other)),
        }
    }
}

/// Time between two times of the same day (negative if `end` precedes `start`)
pub fn delta(start: NaiveTime, end: NaiveTime) -> Duration {
    end.signed_duration_since(start)
}

/// A single interval of work or travel within a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLog {
    /// Database identifier, `None` until persisted
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub log_type: TimeLogType,
    pub start: NaiveTime,
    /// `None` marks an open-ended (still running) work log
    #[serde(default)]
    pub end: Option<NaiveTime>,
    #[serde(default = "Duration::zero", with = "serde_duration")]
    pub pause: Duration,
}

impl TimeLog {
    /// Create a validated time log
    pub fn new(
        log_type: TimeLogType,
        start: NaiveTime,
        end: Option<NaiveTime>,
        pause: Duration,
    ) -> Result<Self, TimeLogError> {
        let log = Self {
            id: None,
            log_type,
            start,
            end,
            pause,
        };
        log.validate()?;
        Ok(log)
    }

    /// Validate the log on its own.
    ///
    /// - Only work logs may be open-ended
    /// - Start must not be after end
    /// - Pause must not be negative nor exceed the logged period
    pub fn validate(&self) -> Result<(), TimeLogError> {
        if self.pause < Duration::zero() {
            return Err(TimeLogError::Invalid(format!(
                "Invalid pause duration: Pause ({}) must not be negative",
                format_duration_hms(self.pause)
            )));
        }

        let Some(end) = self.end else {
            if self.log_type != TimeLogType::Work {
                return Err(TimeLogError::Invalid(format!(
                    "Time logs of type '{}' must have an end time. Only work logs can be open-ended.",
                    self.log_type
                )));
            }
            return Ok(());
        };

        if self.start > end {
            return Err(TimeLogError::Invalid(format!(
                "Invalid time range: Start time ({}) is later than end time ({})",
                self.start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }

        let period = delta(self.start, end);
        if self.pause > period {
            return Err(TimeLogError::Invalid(format!(
                "Invalid pause duration: Pause ({}) is longer than the total time period ({} - {} = {})",
                format_duration_hms(self.pause),
                self.start.format("%H:%M"),
                end.format("%H:%M"),
                format_duration_hms(period)
            )));
        }

        Ok(())
    }

    /// Worked time of the log (zero while open-ended)
    pub fn duration(&self) -> Duration {
        match self.end {
            Some(end) => delta(self.start, end) - self.pause,
            None => Duration::zero(),
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }
}

impl fmt::Display for TimeLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self
            .end
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "open".to_string());
        write!(
            f,
            "type={}, start={}, end={}, pause={}",
            self.log_type,
            self.start.format("%H:%M"),
            end,
            format_duration_hms(self.pause)
        )
    }
}

/// One day in the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub day: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: CalendarEntryType,
    /// Time logs, kept sorted by start time
    #[serde(default)]
    pub logs: Vec<TimeLog>,
}

impl CalendarEntry {
    /// Create an entry without time logs
    pub fn new(day: NaiveDate, entry_type: CalendarEntryType) -> Self {
        Self {
            day,
            entry_type,
            logs: Vec::new(),
        }
    }

    pub fn is_work(&self) -> bool {
        self.entry_type == CalendarEntryType::Work
    }

    /// Work logs in chronological order
    pub fn work_logs(&self) -> impl Iterator<Item = &TimeLog> {
        self.logs
            .iter()
            .filter(|log| log.log_type == TimeLogType::Work)
    }

    /// Total duration of work logs, `None` for non-work entries
    pub fn duration(&self) -> Option<Duration> {
        if !self.is_work() {
            return None;
        }

        Some(
            self.work_logs()
                .fold(Duration::zero(), |total, log| total + log.duration()),
        )
    }

    /// Total pause time, `None` for non-work entries.
    ///
    /// Explicit pauses of work logs plus the gaps between consecutive work
    /// logs. Travel logs are skipped, so travel between two work logs is part
    /// of the gap.
    pub fn pause_time(&self) -> Option<Duration> {
        if !self.is_work() {
            return None;
        }

        let work_logs: Vec<&TimeLog> = self.work_logs().collect();
        let mut total = work_logs
            .iter()
            .fold(Duration::zero(), |total, log| total + log.pause);

        for pair in work_logs.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            if let Some(previous_end) = previous.end {
                if previous_end != current.start {
                    total = total + delta(previous_end, current.start);
                }
            }
        }

        Some(total)
    }

    /// True if any log of the entry is a travel log
    pub fn has_travel(&self) -> bool {
        self.logs
            .iter()
            .any(|log| log.log_type == TimeLogType::Travel)
    }
}

impl fmt::Display for CalendarEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let logs: Vec<String> = self.logs.iter().map(|log| format!("({})", log)).collect();
        write!(
            f,
            "date={}, type={}, logs=[{}]",
            self.day,
            self.entry_type,
            logs.join(", ")
        )
    }
}
