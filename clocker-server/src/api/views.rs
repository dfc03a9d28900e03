//! View data for the static pages
//!
//! The pages fetch these JSON documents and render them client-side. All
//! durations arrive pre-formatted (`HH:MM`).

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate};
use clocker_common::human_time::{format_duration, format_optional_duration, format_time};
use clocker_common::statistics::{ComplianceViolation, Statistics};
use clocker_common::time::{
    adjacent_months, is_weekend, iterate, month_name, month_range, weekday_name,
};
use clocker_common::{CalendarEntry, CalendarEntryType, StatisticsService, TimeLogType};
use serde::Serialize;
use tracing::debug;

use super::entries::MonthQuery;
use super::statistics::YearQuery;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for MonthRef {
    fn from(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }
}

/// One row of the month table
#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub weekday: String,
    pub is_weekend: bool,
    pub entry: Option<CalendarEntry>,
    pub work_time: String,
    pub pause_time: String,
    pub flextime: String,
    pub has_travel: bool,
}

#[derive(Debug, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub previous: MonthRef,
    pub next: MonthRef,
    pub days: Vec<DayView>,
    pub statistics: Statistics,
    pub total_work_hours: String,
    pub flextime_balance: String,
}

#[derive(Debug, Serialize)]
pub struct LogView {
    pub index: usize,
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub log_type: TimeLogType,
    pub start: String,
    pub end: String,
    pub pause: String,
    pub duration: String,
}

#[derive(Debug, Serialize)]
pub struct EntryView {
    pub date: NaiveDate,
    pub weekday: String,
    pub previous_day: Option<NaiveDate>,
    pub next_day: Option<NaiveDate>,
    pub entry: Option<CalendarEntry>,
    pub logs: Vec<LogView>,
    pub work_time: String,
    pub pause_time: String,
    pub flextime: String,
    pub compliance_violations: Vec<ComplianceViolation>,
}

/// One cell of a year grid
#[derive(Debug, Serialize)]
pub struct GridDay {
    pub day: u32,
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub entry_type: Option<CalendarEntryType>,
}

/// Month grid starting on Monday; leading cells before the 1st are `None`
#[derive(Debug, Serialize)]
pub struct MonthGrid {
    pub month: u32,
    pub name: String,
    pub cells: Vec<Option<GridDay>>,
}

#[derive(Debug, Serialize)]
pub struct YearView {
    pub year: i32,
    pub months: Vec<MonthGrid>,
    pub statistics: Statistics,
    pub total_work_hours: String,
    pub flextime_balance: String,
}

/// GET /api/v1/views/month?year=&month=
pub async fn month_view(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<MonthView>> {
    let (year, month) = query.resolve();
    let entries = state.calendar.get_month(year, month).await?;
    debug!("Month view {}-{:02}: {} entries", year, month, entries.len());
    Ok(Json(build_month_view(year, month, &entries, &state.statistics)?))
}

/// GET /api/v1/views/entries/:date
pub async fn entry_view(
    State(state): State<AppState>,
    Path(day): Path<NaiveDate>,
) -> ApiResult<Json<EntryView>> {
    let entry = state.calendar.get_by_date(day).await?;
    let previous = match day.pred_opt() {
        Some(previous_day) => state.calendar.get_by_date(previous_day).await?,
        None => None,
    };
    Ok(Json(build_entry_view(
        day,
        entry,
        previous.as_ref(),
        &state.statistics,
    )))
}

/// GET /api/v1/views/year?year=
pub async fn year_view(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<YearView>> {
    let year = query.year.unwrap_or_else(|| clocker_common::time::today().year());
    let entries = state.calendar.get_year(year).await?;
    Ok(Json(build_year_view(year, &entries, &state.statistics)?))
}

pub fn build_month_view(
    year: i32,
    month: u32,
    entries: &BTreeMap<NaiveDate, CalendarEntry>,
    statistics: &StatisticsService,
) -> clocker_common::Result<MonthView> {
    let (first, last) = month_range(year, month)?;
    let (previous, next) = adjacent_months(first);

    let days = iterate(first, last)?
        .map(|date| {
            let entry = entries.get(&date);
            DayView {
                date,
                weekday: weekday_name(date),
                is_weekend: is_weekend(date),
                work_time: format_optional_duration(entry.and_then(|e| e.duration())),
                pause_time: format_optional_duration(entry.and_then(|e| e.pause_time())),
                flextime: format_optional_duration(
                    entry.and_then(|e| statistics.calculate_flextime(e)),
                ),
                has_travel: entry.is_some_and(|e| e.has_travel()),
                entry: entry.cloned(),
            }
        })
        .collect();

    let month_statistics = statistics.calculate_statistics(entries.values());

    Ok(MonthView {
        year,
        month,
        title: month_name(first),
        previous: previous.into(),
        next: next.into(),
        days,
        total_work_hours: format_duration(month_statistics.total_work_hours),
        flextime_balance: format_duration(month_statistics.flextime_balance),
        statistics: month_statistics,
    })
}

pub fn build_entry_view(
    day: NaiveDate,
    entry: Option<CalendarEntry>,
    previous: Option<&CalendarEntry>,
    statistics: &StatisticsService,
) -> EntryView {
    let logs = entry
        .iter()
        .flat_map(|e| e.logs.iter().enumerate())
        .map(|(index, log)| LogView {
            index,
            id: log.id,
            log_type: log.log_type,
            start: format_time(Some(log.start)),
            end: format_time(log.end),
            pause: format_duration(log.pause),
            duration: format_duration(log.duration()),
        })
        .collect();

    let compliance_violations = entry
        .as_ref()
        .map(|e| statistics.compliance_check(e, previous))
        .unwrap_or_default();

    EntryView {
        date: day,
        weekday: weekday_name(day),
        previous_day: day.pred_opt(),
        next_day: day.succ_opt(),
        logs,
        work_time: format_optional_duration(entry.as_ref().and_then(|e| e.duration())),
        pause_time: format_optional_duration(entry.as_ref().and_then(|e| e.pause_time())),
        flextime: format_optional_duration(
            entry.as_ref().and_then(|e| statistics.calculate_flextime(e)),
        ),
        compliance_violations,
        entry,
    }
}

pub fn build_year_view(
    year: i32,
    entries: &BTreeMap<NaiveDate, CalendarEntry>,
    statistics: &StatisticsService,
) -> clocker_common::Result<YearView> {
    let months = (1..=12)
        .map(|month| month_grid(year, month, entries))
        .collect::<clocker_common::Result<Vec<_>>>()?;

    let year_statistics = statistics.calculate_statistics(entries.values());

    Ok(YearView {
        year,
        months,
        total_work_hours: format_duration(year_statistics.total_work_hours),
        flextime_balance: format_duration(year_statistics.flextime_balance),
        statistics: year_statistics,
    })
}

fn month_grid(
    year: i32,
    month: u32,
    entries: &BTreeMap<NaiveDate, CalendarEntry>,
) -> clocker_common::Result<MonthGrid> {
    let (first, last) = month_range(year, month)?;
    let leading = first.weekday().num_days_from_monday() as usize;

    let mut cells: Vec<Option<GridDay>> = (0..leading).map(|_| None).collect();
    cells.extend(iterate(first, last)?.map(|date| {
        Some(GridDay {
            day: date.day(),
            date,
            is_weekend: is_weekend(date),
            entry_type: entries.get(&date).map(|e| e.entry_type),
        })
    }));

    Ok(MonthGrid {
        month,
        name: first.format("%B").to_string(),
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime};
    use clocker_common::statistics::ViolationType;
    use clocker_common::TimeLog;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn work(day: NaiveDate, start: NaiveTime, end: NaiveTime, pause: Duration) -> CalendarEntry {
        let mut entry = CalendarEntry::new(day, CalendarEntryType::Work);
        entry
            .logs
            .push(TimeLog::new(TimeLogType::Work, start, Some(end), pause).unwrap());
        entry
    }

    #[test]
    fn test_month_view_lists_every_day() {
        let mut entries = BTreeMap::new();
        let day = d(2024, 11, 18);
        entries.insert(day, work(day, t(8, 0), t(17, 0), Duration::minutes(30)));

        let view = build_month_view(2024, 11, &entries, &StatisticsService::default()).unwrap();

        assert_eq!(view.title, "November 2024");
        assert_eq!(view.days.len(), 30);
        assert_eq!(view.previous, MonthRef { year: 2024, month: 10 });
        assert_eq!(view.next, MonthRef { year: 2024, month: 12 });

        let monday = &view.days[17];
        assert_eq!(monday.date, day);
        assert_eq!(monday.weekday, "Monday");
        assert_eq!(monday.work_time, "08:30");
        assert_eq!(monday.pause_time, "00:30");
        assert_eq!(monday.flextime, "00:30");
        assert!(view.days[16].is_weekend);
        assert_eq!(view.days[16].work_time, "");

        assert_eq!(view.total_work_hours, "08:30");
        assert_eq!(view.statistics.entry_counts.work, 1);
    }

    #[test]
    fn test_month_view_rolls_over_year() {
        let view =
            build_month_view(2024, 12, &BTreeMap::new(), &StatisticsService::default()).unwrap();
        assert_eq!(view.next, MonthRef { year: 2025, month: 1 });
        assert_eq!(view.flextime_balance, "00:00");
    }

    #[test]
    fn test_month_view_rejects_invalid_month() {
        assert!(build_month_view(2024, 13, &BTreeMap::new(), &StatisticsService::default()).is_err());
    }

    #[test]
    fn test_entry_view_reports_rest_period_violation() {
        let previous = work(d(2024, 11, 18), t(12, 0), t(22, 0), Duration::minutes(45));
        let entry = work(d(2024, 11, 19), t(6, 0), t(12, 0), Duration::zero());

        let view = build_entry_view(
            entry.day,
            Some(entry),
            Some(&previous),
            &StatisticsService::default(),
        );

        assert_eq!(view.weekday, "Tuesday");
        assert_eq!(view.previous_day, Some(d(2024, 11, 18)));
        assert_eq!(view.logs.len(), 1);
        assert_eq!(view.logs[0].start, "06:00");
        assert_eq!(view.logs[0].end, "12:00");
        assert_eq!(view.logs[0].duration, "06:00");
        assert_eq!(view.flextime, "-02:00");
        assert!(view
            .compliance_violations
            .iter()
            .any(|v| v.violation_type == ViolationType::RestPeriod));
    }

    #[test]
    fn test_entry_view_without_entry() {
        let view = build_entry_view(d(2024, 11, 23), None, None, &StatisticsService::default());
        assert!(view.entry.is_none());
        assert!(view.logs.is_empty());
        assert_eq!(view.work_time, "");
        assert!(view.compliance_violations.is_empty());
    }

    #[test]
    fn test_year_grid_is_monday_aligned() {
        let mut entries = BTreeMap::new();
        let new_year = d(2024, 1, 1);
        entries.insert(new_year, CalendarEntry::new(new_year, CalendarEntryType::Holiday));

        let view = build_year_view(2024, &entries, &StatisticsService::default()).unwrap();
        assert_eq!(view.months.len(), 12);

        // 2024-01-01 is a Monday
        let january = &view.months[0];
        assert_eq!(january.name, "January");
        assert_eq!(january.cells.len(), 31);
        let first = january.cells[0].as_ref().unwrap();
        assert_eq!(first.entry_type, Some(CalendarEntryType::Holiday));

        // 2024-02-01 is a Thursday
        let february = &view.months[1];
        assert!(february.cells[..3].iter().all(Option::is_none));
        assert_eq!(february.cells[3].as_ref().unwrap().day, 1);
        assert_eq!(february.cells.len(), 3 + 29);

        assert_eq!(view.statistics.entry_counts.holiday, 1);
    }
}
