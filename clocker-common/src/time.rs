//! Date utilities
//!
//! Calendar arithmetic shared by the calendar service, the statistics views
//! and the HTTP layer.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use crate::{Error, Result};

/// Today's date in the local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Check if a day is a weekday (Monday to Friday)
pub fn is_work_day(day: NaiveDate) -> bool {
    !is_weekend(day)
}

/// Check if a day falls on Saturday or Sunday
pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Full English weekday name ("Monday", "Tuesday", ...)
pub fn weekday_name(day: NaiveDate) -> String {
    day.format("%A").to_string()
}

/// Month and year ("January 2024")
pub fn month_name(day: NaiveDate) -> String {
    day.format("%B %Y").to_string()
}

/// First day of a month, rejecting invalid year/month combinations
pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidInput(format!("Invalid month: {}-{:02}", year, month)))
}

/// First and last date of the given month
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = first_of_month(year, month)?;
    let (_, next) = adjacent_months(first);
    Ok((first, next - Duration::days(1)))
}

/// First and last date of the given year
pub fn year_range(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let first = first_of_month(year, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| Error::InvalidInput(format!("Invalid year: {}", year)))?;
    Ok((first, last))
}

/// First days of the previous and next month, rolling over year boundaries
pub fn adjacent_months(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (year, month) = (day.year(), day.month());

    let (prev_year, prev_month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };

    // Day 1 exists in every month of every representable year
    let first = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(day);
    (first(prev_year, prev_month), first(next_year, next_month))
}

/// Iterate over all dates between `start` and `end` (both inclusive)
pub fn iterate(start: NaiveDate, end: NaiveDate) -> Result<impl Iterator<Item = NaiveDate>> {
    if end < start {
        return Err(Error::InvalidInput(format!(
            "The end date ({}) must not be before the start date ({})",
            end, start
        )));
    }

    Ok(start.iter_days().take_while(move |day| *day <= end))
}

/// Iterate over the weekdays (Monday to Friday) between `start` and `end`
pub fn workdays(start: NaiveDate, end: NaiveDate) -> Result<impl Iterator<Item = NaiveDate>> {
    Ok(iterate(start, end)?.filter(|day| is_work_day(*day)))
}
