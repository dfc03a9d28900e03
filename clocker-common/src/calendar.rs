//! Calendar service
//!
//! Creates, loads and removes calendar entries on top of the entry store,
//! seeds public holidays and plans vacation ranges.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db::entries;
use crate::holidays::{public_holidays, FederalState};
use crate::models::{CalendarEntry, CalendarEntryType, TimeLog};
use crate::time_logger::add_time_log;
use crate::{Error, Result};

pub use crate::time::{is_work_day, iterate, month_range, workdays, year_range};

/// Calendar operations over one database
#[derive(Debug, Clone)]
pub struct Calendar {
    db: SqlitePool,
    holiday_state: FederalState,
}

impl Calendar {
    /// Create a calendar seeding holidays of `holiday_state`
    pub fn new(db: SqlitePool, holiday_state: FederalState) -> Self {
        Self { db, holiday_state }
    }

    pub fn holiday_state(&self) -> FederalState {
        self.holiday_state
    }

    /// Entry of a single day
    pub async fn get_by_date(&self, day: NaiveDate) -> Result<Option<CalendarEntry>> {
        entries::get_by_date(&self.db, day).await
    }

    /// Entries between `start` and `end` (inclusive)
    pub async fn get_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, CalendarEntry>> {
        entries::get_by_date_range(&self.db, start, end).await
    }

    /// All entries of a month
    pub async fn get_month(&self, year: i32, month: u32) -> Result<BTreeMap<NaiveDate, CalendarEntry>> {
        let (start, end) = month_range(year, month)?;
        let entries = self.get_range(start, end).await?;

        debug!("Retrieved {} calendar entries of {}/{}", entries.len(), year, month);
        Ok(entries)
    }

    /// All entries of a year. Public holidays are added first when the year
    /// has no holiday entries yet.
    pub async fn get_year(&self, year: i32) -> Result<BTreeMap<NaiveDate, CalendarEntry>> {
        let (start, end) = year_range(year)?;
        let mut entries = self.get_range(start, end).await?;

        let has_holidays = entries
            .values()
            .any(|entry| entry.entry_type == CalendarEntryType::Holiday);
        if !has_holidays {
            for entry in self.add_public_holidays(year, self.holiday_state).await? {
                entries.insert(entry.day, entry);
            }
        }

        debug!("Retrieved {} calendar entries of {}", entries.len(), year);
        Ok(entries)
    }

    async fn ensure_can_create(&self, day: NaiveDate, entry_type: CalendarEntryType) -> Result<()> {
        if self.get_by_date(day).await?.is_some() {
            return Err(Error::Conflict(format!("Entry already exists for {}", day)));
        }

        if entry_type == CalendarEntryType::Work && !is_work_day(day) {
            return Err(Error::InvalidInput(
                "Cannot create work entry on weekend".to_string(),
            ));
        }

        Ok(())
    }

    /// Create an empty entry
    pub async fn create_entry(&self, day: NaiveDate, entry_type: CalendarEntryType) -> Result<CalendarEntry> {
        self.create_entry_with_logs(day, entry_type, &[]).await
    }

    /// Create an entry together with its logs.
    ///
    /// The logs are validated before anything is written, so a rejected log
    /// leaves no entry behind.
    pub async fn create_entry_with_logs(
        &self,
        day: NaiveDate,
        entry_type: CalendarEntryType,
        logs: &[TimeLog],
    ) -> Result<CalendarEntry> {
        self.ensure_can_create(day, entry_type).await?;

        let mut entry = CalendarEntry::new(day, entry_type);
        for log in logs {
            add_time_log(&mut entry, log.log_type, log.start, log.end, log.pause)?;
        }

        let saved = entries::save(&self.db, &entry).await?;
        info!("Created calendar entry: {}", saved);
        Ok(saved)
    }

    /// Create entries of a non-work type on all workdays of a range.
    /// Days that already carry an entry are skipped.
    pub async fn create_entries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        entry_type: CalendarEntryType,
    ) -> Result<Vec<CalendarEntry>> {
        let days: Vec<NaiveDate> = workdays(start, end)?.collect();
        if entry_type == CalendarEntryType::Work {
            return Ok(Vec::new());
        }

        let existing = self.get_range(start, end).await?;
        let new_entries: Vec<CalendarEntry> = days
            .into_iter()
            .filter(|day| !existing.contains_key(day))
            .map(|day| CalendarEntry::new(day, entry_type))
            .collect();

        let saved = entries::save_all(&self.db, &new_entries).await?;
        info!("Created {} {} entries between {} and {}", saved.len(), entry_type, start, end);
        Ok(saved)
    }

    /// Persist changes of an entry
    pub async fn update_entry(&self, entry: &CalendarEntry) -> Result<CalendarEntry> {
        let saved = entries::save(&self.db, entry).await?;
        info!("Updated calendar entry: {}", saved);
        Ok(saved)
    }

    /// Reload the persisted state of an entry, dropping unsaved changes
    pub async fn reset_entry(&self, entry: &CalendarEntry) -> Result<CalendarEntry> {
        self.get_by_date(entry.day)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Entry does not exist for {}", entry.day)))
    }

    /// Delete the entry of a day and return it
    pub async fn remove_entry(&self, day: NaiveDate) -> Result<CalendarEntry> {
        let entry = self
            .get_by_date(day)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Entry does not exist for {}", day)))?;

        entries::delete(&self.db, day).await?;
        info!("Removed calendar entry: {}", entry);
        Ok(entry)
    }

    /// Delete all entries of a range and return them
    pub async fn remove_entries(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarEntry>> {
        let existing = self.get_range(start, end).await?;
        if existing.is_empty() {
            return Ok(Vec::new());
        }

        let days: Vec<NaiveDate> = existing.keys().copied().collect();
        entries::delete_all(&self.db, &days).await?;

        let removed: Vec<CalendarEntry> = existing.into_values().collect();
        for entry in &removed {
            info!("Removed calendar entry: {}", entry);
        }
        Ok(removed)
    }

    /// Add holiday entries for the public holidays of a year.
    ///
    /// Days that already carry a holiday are skipped silently; days carrying
    /// any other entry are skipped with a warning.
    pub async fn add_public_holidays(&self, year: i32, state: FederalState) -> Result<Vec<CalendarEntry>> {
        let (start, end) = year_range(year)?;
        let existing = self.get_range(start, end).await?;

        let mut new_entries = Vec::new();
        for holiday in public_holidays(year, state)? {
            if let Some(entry) = existing.get(&holiday.day) {
                if entry.entry_type != CalendarEntryType::Holiday {
                    warn!("Cannot add holiday '{}' to {}", holiday.name, holiday.day);
                }
                continue;
            }
            new_entries.push(CalendarEntry::new(holiday.day, CalendarEntryType::Holiday));
        }

        let saved = entries::save_all(&self.db, &new_entries).await?;
        info!("Added {} public holidays of {} for {}", saved.len(), year, state);
        Ok(saved)
    }

    /// Workdays of a range that are neither public holidays nor carry an entry
    pub async fn get_available_vacation_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        let days: Vec<NaiveDate> = workdays(start, end)?.collect();
        let existing = self.get_range(start, end).await?;

        let years: BTreeSet<i32> = days.iter().map(|day| day.year()).collect();
        let mut holidays = BTreeSet::new();
        for year in years {
            holidays.extend(
                public_holidays(year, self.holiday_state)?
                    .into_iter()
                    .map(|holiday| holiday.day),
            );
        }

        Ok(days
            .into_iter()
            .filter(|day| !existing.contains_key(day) && !holidays.contains(day))
            .collect())
    }

    /// Create vacation entries on all available dates of a range
    pub async fn create_vacation_entries(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarEntry>> {
        let new_entries: Vec<CalendarEntry> = self
            .get_available_vacation_dates(start, end)
            .await?
            .into_iter()
            .map(|day| CalendarEntry::new(day, CalendarEntryType::Vacation))
            .collect();

        let saved = entries::save_all(&self.db, &new_entries).await?;
        info!("Created {} vacation entries between {} and {}", saved.len(), start, end);
        Ok(saved)
    }
}
