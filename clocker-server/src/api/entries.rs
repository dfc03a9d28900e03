//! Calendar entry endpoints
//!
//! CRUD for single days, copying a day, and batch vacation booking.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate};
use clocker_common::time::today;
use clocker_common::time_logger::replace_time_logs;
use clocker_common::{CalendarEntry, CalendarEntryType, Error, TimeLog};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for the month listing; both default to the current month
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl MonthQuery {
    pub fn resolve(&self) -> (i32, u32) {
        let now = today();
        (
            self.year.unwrap_or_else(|| now.year()),
            self.month.unwrap_or_else(|| now.month()),
        )
    }
}

/// Body of create and update requests
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    #[serde(rename = "type")]
    pub entry_type: CalendarEntryType,
    #[serde(default)]
    pub logs: Vec<TimeLog>,
}

#[derive(Debug, Deserialize)]
pub struct CopyQuery {
    pub source_date: NaiveDate,
}

/// Date range of a vacation booking, as query or body
#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    fn check(&self) -> ApiResult<()> {
        if self.end_date < self.start_date {
            return Err(ApiError::BadRequest(
                "End date must not be before start date".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct VacationPreview {
    pub available_count: usize,
    pub available_dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct VacationCreated {
    pub created_count: usize,
    pub created_entries: Vec<CalendarEntry>,
}

fn not_found(day: NaiveDate) -> ApiError {
    ApiError::NotFound(format!("No entry found for {}", day))
}

/// GET /api/v1/entries?year=&month=
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<Vec<CalendarEntry>>> {
    let (year, month) = query.resolve();
    let entries = state.calendar.get_month(year, month).await?;
    Ok(Json(entries.into_values().collect()))
}

/// GET /api/v1/entries/:date
pub async fn get_entry(
    State(state): State<AppState>,
    Path(day): Path<NaiveDate>,
) -> ApiResult<Json<CalendarEntry>> {
    state
        .calendar
        .get_by_date(day)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(day))
}

/// POST /api/v1/entries/:date
///
/// Logs are validated before anything is written.
pub async fn create_entry(
    State(state): State<AppState>,
    Path(day): Path<NaiveDate>,
    Json(request): Json<EntryRequest>,
) -> ApiResult<Json<CalendarEntry>> {
    let entry = state
        .calendar
        .create_entry_with_logs(day, request.entry_type, &request.logs)
        .await?;
    Ok(Json(entry))
}

/// PATCH /api/v1/entries/:date
///
/// Switching to a non-work type drops all logs. Otherwise the logs of the
/// request become the logs of the day: ids the entry knows are updated,
/// missing ones removed and the rest added.
pub async fn update_entry(
    State(state): State<AppState>,
    Path(day): Path<NaiveDate>,
    Json(request): Json<EntryRequest>,
) -> ApiResult<Json<CalendarEntry>> {
    let mut entry = state
        .calendar
        .get_by_date(day)
        .await?
        .ok_or_else(|| not_found(day))?;

    if entry.entry_type != request.entry_type {
        info!(
            "Changing type of {} from {} to {}",
            day, entry.entry_type, request.entry_type
        );
        entry.entry_type = request.entry_type;
    }

    if entry.is_work() {
        replace_time_logs(&mut entry, &request.logs)?;
    } else {
        entry.logs.clear();
    }

    let updated = state.calendar.update_entry(&entry).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/entries/:date
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(day): Path<NaiveDate>,
) -> ApiResult<Json<CalendarEntry>> {
    let removed = state.calendar.remove_entry(day).await?;
    Ok(Json(removed))
}

/// POST /api/v1/entries/:date/copy?source_date=
pub async fn copy_entry(
    State(state): State<AppState>,
    Path(day): Path<NaiveDate>,
    Query(query): Query<CopyQuery>,
) -> ApiResult<Json<CalendarEntry>> {
    let source = state
        .calendar
        .get_by_date(query.source_date)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No entry found for source date {}", query.source_date))
        })?;

    let copy = state
        .calendar
        .create_entry_with_logs(day, source.entry_type, &source.logs)
        .await
        .map_err(|e| match e {
            Error::Conflict(msg) => ApiError::BadRequest(msg),
            other => other.into(),
        })?;

    info!("Copied entry {} to {}", query.source_date, day);
    Ok(Json(copy))
}

/// GET /api/v1/entries/batch/vacation/preview?start_date=&end_date=
pub async fn preview_vacation(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> ApiResult<Json<VacationPreview>> {
    range.check()?;
    let dates = state
        .calendar
        .get_available_vacation_dates(range.start_date, range.end_date)
        .await?;

    Ok(Json(VacationPreview {
        available_count: dates.len(),
        available_dates: dates,
    }))
}

/// POST /api/v1/entries/batch/vacation
pub async fn create_vacation(
    State(state): State<AppState>,
    Json(range): Json<DateRange>,
) -> ApiResult<Json<VacationCreated>> {
    range.check()?;
    let created = state
        .calendar
        .create_vacation_entries(range.start_date, range.end_date)
        .await?;

    Ok(Json(VacationCreated {
        created_count: created.len(),
        created_entries: created,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_date_range_rejects_reversed_dates() {
        let range = DateRange {
            start_date: d(2024, 11, 20),
            end_date: d(2024, 11, 18),
        };
        let err = range.check().unwrap_err();
        assert_eq!(err.to_string(), "End date must not be before start date");
    }

    #[test]
    fn test_date_range_accepts_single_day() {
        let range = DateRange {
            start_date: d(2024, 11, 18),
            end_date: d(2024, 11, 18),
        };
        assert!(range.check().is_ok());
    }

    #[test]
    fn test_month_query_keeps_explicit_values() {
        let query = MonthQuery {
            year: Some(2023),
            month: Some(2),
        };
        assert_eq!(query.resolve(), (2023, 2));
    }

    #[test]
    fn test_entry_request_without_logs() {
        let request: EntryRequest = serde_json::from_str(r#"{"type": "vacation"}"#).unwrap();
        assert_eq!(request.entry_type, CalendarEntryType::Vacation);
        assert!(request.logs.is_empty());
    }
}
