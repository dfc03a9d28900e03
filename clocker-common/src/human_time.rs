//! Human-readable time formatting
//!
//! Provides consistent duration and time-of-day display formatting for the
//! API, the views and the configuration file.
//!
//! Two duration formats are used:
//! - Display format (`HH:MM`): seconds are truncated, hours may exceed 24
//! - Exchange format (`HH:MM:SS`): lossless, used on the wire and in config

use chrono::{Duration, NaiveTime};

/// Split an absolute number of seconds into hours, minutes and seconds
fn split_seconds(total: i64) -> (i64, i64, i64) {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    (hours, minutes, seconds)
}

/// Format a duration as `HH:MM`.
///
/// Negative durations are prefixed with `-`. Remaining seconds are dropped,
/// so 90 seconds display as `00:01`.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use clocker_common::human_time::format_duration;
///
/// assert_eq!(format_duration(Duration::minutes(90)), "01:30");
/// assert_eq!(format_duration(Duration::hours(100)), "100:00");
/// assert_eq!(format_duration(-Duration::minutes(5)), "-00:05");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let (hours, minutes, _) = split_seconds(total.abs());

    if total < 0 {
        format!("-{:02}:{:02}", hours, minutes)
    } else {
        format!("{:02}:{:02}", hours, minutes)
    }
}

/// Format an optional duration, empty string for `None`
pub fn format_optional_duration(duration: Option<Duration>) -> String {
    duration.map(format_duration).unwrap_or_default()
}

/// Format a duration as `HH:MM:SS` (with a leading `-` when negative)
pub fn format_duration_hms(duration: Duration) -> String {
    let total = duration.num_seconds();
    let (hours, minutes, seconds) = split_seconds(total.abs());
    let sign = if total < 0 { "-" } else { "" };

    format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
}

/// Format a time of day in 24-hour `HH:MM` format, empty for `None`
pub fn format_time(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Parse a duration written as `[-]HH:MM` or `[-]HH:MM:SS`.
///
/// Minutes and seconds must be below 60; hours are unbounded.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("Invalid duration '{}': expected HH:MM or HH:MM:SS", value));
    }

    let mut numbers = [0i64; 3];
    for (slot, part) in numbers.iter_mut().zip(parts.iter()) {
        *slot = part
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| format!("Invalid duration '{}': '{}' is not a number", value, part))?;
    }

    let [hours, minutes, seconds] = numbers;
    if minutes >= 60 || seconds >= 60 {
        return Err(format!("Invalid duration '{}': minutes and seconds must be below 60", value));
    }

    let duration = hours
        .checked_mul(3600)
        .and_then(|total| total.checked_add(minutes * 60 + seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| format!("Invalid duration '{}': out of range", value))?;
    Ok(if negative { -duration } else { duration })
}

/// Serde adapter for `chrono::Duration`.
///
/// Serializes as `[-]HH:MM:SS`. Deserializes from such a string (seconds
/// optional) or from an integer number of seconds.
///
/// ```ignore
/// #[serde(with = "clocker_common::human_time::serde_duration")]
/// pause: chrono::Duration,
/// ```
pub mod serde_duration {
    use chrono::Duration;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_duration_hms(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DurationVisitor)
    }

    struct DurationVisitor;

    impl<'de> de::Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a duration as \"HH:MM[:SS]\" or a number of seconds")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Duration, E> {
            super::parse_duration(value).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Duration, E> {
            Duration::try_seconds(value)
                .ok_or_else(|| E::custom(format!("duration of {} seconds is out of range", value)))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Duration, E> {
            i64::try_from(value)
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or_else(|| E::custom(format!("duration of {} seconds is out of range", value)))
        }
    }
}
