//! Calendar entry queries
//!
//! An entry is stored as one `calendar_entry` row plus its `time_log` rows.
//! Saving an entry replaces all of its logs within one transaction.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveTime};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::models::{CalendarEntry, CalendarEntryType, TimeLog, TimeLogType};
use crate::{Error, Result};

type LogRow = (i64, NaiveDate, String, NaiveTime, Option<NaiveTime>, i64);

fn parse_entry_type(value: &str) -> Result<CalendarEntryType> {
    value.parse().map_err(Error::Internal)
}

fn log_from_row(row: LogRow) -> Result<(NaiveDate, TimeLog)> {
    let (id, day, log_type, start, end, pause_seconds) = row;
    let log_type: TimeLogType = log_type.parse().map_err(Error::Internal)?;
    let pause = Duration::try_seconds(pause_seconds).ok_or_else(|| {
        Error::Internal(format!("Stored pause of {} seconds is out of range", pause_seconds))
    })?;

    Ok((
        day,
        TimeLog {
            id: Some(id),
            log_type,
            start,
            end,
            pause,
        },
    ))
}

/// Load the entry of a single day
pub async fn get_by_date(pool: &SqlitePool, day: NaiveDate) -> Result<Option<CalendarEntry>> {
    Ok(get_by_date_range(pool, day, day).await?.remove(&day))
}

/// Load all entries between `start` and `end` (inclusive), keyed by day
pub async fn get_by_date_range(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BTreeMap<NaiveDate, CalendarEntry>> {
    let rows: Vec<(NaiveDate, String)> = sqlx::query_as(
        "SELECT day, type FROM calendar_entry WHERE day BETWEEN ? AND ? ORDER BY day",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let mut entries = BTreeMap::new();
    for (day, entry_type) in rows {
        entries.insert(day, CalendarEntry::new(day, parse_entry_type(&entry_type)?));
    }

    let log_rows: Vec<LogRow> = sqlx::query_as(
        r#"
        SELECT id, day, type, start, "end", pause_seconds
        FROM time_log
        WHERE day BETWEEN ? AND ?
        ORDER BY day, start
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    for row in log_rows {
        let (day, log) = log_from_row(row)?;
        if let Some(entry) = entries.get_mut(&day) {
            entry.logs.push(log);
        }
    }

    for entry in entries.values_mut() {
        entry.logs.sort_by_key(|log| log.start);
    }

    debug!("Loaded {} entries between {} and {}", entries.len(), start, end);
    Ok(entries)
}

async fn write_entry(conn: &mut SqliteConnection, entry: &CalendarEntry) -> Result<CalendarEntry> {
    sqlx::query(
        r#"
        INSERT INTO calendar_entry (day, type) VALUES (?, ?)
        ON CONFLICT(day) DO UPDATE SET type = excluded.type
        "#,
    )
    .bind(entry.day)
    .bind(entry.entry_type.as_str())
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM time_log WHERE day = ?")
        .bind(entry.day)
        .execute(&mut *conn)
        .await?;

    let mut saved = CalendarEntry::new(entry.day, entry.entry_type);
    for log in &entry.logs {
        let result = sqlx::query(
            r#"
            INSERT INTO time_log (id, day, type, start, "end", pause_seconds)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.id)
        .bind(entry.day)
        .bind(log.log_type.as_str())
        .bind(log.start)
        .bind(log.end)
        .bind(log.pause.num_seconds())
        .execute(&mut *conn)
        .await?;

        saved.logs.push(TimeLog {
            id: Some(result.last_insert_rowid()),
            ..log.clone()
        });
    }

    Ok(saved)
}

/// Insert or update an entry and replace its logs. Returns the entry with
/// database ids assigned to all logs.
pub async fn save(pool: &SqlitePool, entry: &CalendarEntry) -> Result<CalendarEntry> {
    let mut tx = pool.begin().await?;
    let saved = write_entry(&mut tx, entry).await?;
    tx.commit().await?;

    debug!("Saved entry {}", saved);
    Ok(saved)
}

/// Save several entries in one transaction
pub async fn save_all(pool: &SqlitePool, entries: &[CalendarEntry]) -> Result<Vec<CalendarEntry>> {
    let mut tx = pool.begin().await?;
    let mut saved = Vec::with_capacity(entries.len());
    for entry in entries {
        saved.push(write_entry(&mut tx, entry).await?);
    }
    tx.commit().await?;

    debug!("Saved {} entries", saved.len());
    Ok(saved)
}

/// Delete the entry of a day with its logs. Returns false when absent.
pub async fn delete(pool: &SqlitePool, day: NaiveDate) -> Result<bool> {
    Ok(delete_all(pool, &[day]).await? > 0)
}

/// Delete the entries of the given days. Returns the number of removed entries.
pub async fn delete_all(pool: &SqlitePool, days: &[NaiveDate]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut removed = 0;
    for day in days {
        sqlx::query("DELETE FROM time_log WHERE day = ?")
            .bind(day)
            .execute(&mut *tx)
            .await?;

        removed += sqlx::query("DELETE FROM calendar_entry WHERE day = ?")
            .bind(day)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    debug!("Deleted {} entries", removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn work_entry(day: NaiveDate) -> CalendarEntry {
        let mut entry = CalendarEntry::new(day, CalendarEntryType::Work);
        entry.logs = vec![
            TimeLog::new(TimeLogType::Work, t(13, 0), Some(t(17, 0)), Duration::minutes(15)).unwrap(),
            TimeLog::new(TimeLogType::Travel, t(18, 0), Some(t(19, 0)), Duration::zero()).unwrap(),
        ];
        entry
    }

    #[tokio::test]
    async fn test_save_and_load_entry() {
        let pool = init_memory_database().await.unwrap();
        let saved = save(&pool, &work_entry(date(18))).await.unwrap();
        assert!(saved.logs.iter().all(|log| log.id.is_some()));

        let loaded = get_by_date(&pool, date(18)).await.unwrap().unwrap();
        assert_eq!(loaded.entry_type, CalendarEntryType::Work);
        assert_eq!(loaded.logs.len(), 2);
        assert_eq!(loaded.logs[0].start, t(13, 0));
        assert_eq!(loaded.logs[0].pause, Duration::minutes(15));
        assert_eq!(loaded.logs[1].log_type, TimeLogType::Travel);
        assert_eq!(loaded.logs[1].end, Some(t(19, 0)));
    }

    #[tokio::test]
    async fn test_open_ended_log_round_trips() {
        let pool = init_memory_database().await.unwrap();
        let mut entry = CalendarEntry::new(date(18), CalendarEntryType::Work);
        entry.logs = vec![TimeLog::new(TimeLogType::Work, t(9, 0), None, Duration::zero()).unwrap()];
        save(&pool, &entry).await.unwrap();

        let loaded = get_by_date(&pool, date(18)).await.unwrap().unwrap();
        assert!(loaded.logs[0].is_open_ended());
    }

    #[tokio::test]
    async fn test_out_of_range_stored_pause_is_an_error() {
        let pool = init_memory_database().await.unwrap();
        save(&pool, &CalendarEntry::new(date(18), CalendarEntryType::Work)).await.unwrap();
        sqlx::query(
            r#"INSERT INTO time_log (day, type, start, "end", pause_seconds) VALUES (?, 'work', ?, ?, ?)"#,
        )
        .bind(date(18))
        .bind(t(9, 0))
        .bind(t(17, 0))
        .bind(i64::MAX)
        .execute(&pool)
        .await
        .unwrap();

        let err = get_by_date(&pool, date(18)).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let pool = init_memory_database().await.unwrap();
        assert!(get_by_date(&pool, date(18)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_logs_and_keeps_ids() {
        let pool = init_memory_database().await.unwrap();
        let mut saved = save(&pool, &work_entry(date(18))).await.unwrap();
        let kept_id = saved.logs[1].id;

        saved.logs.remove(0);
        save(&pool, &saved).await.unwrap();

        let loaded = get_by_date(&pool, date(18)).await.unwrap().unwrap();
        assert_eq!(loaded.logs.len(), 1);
        assert_eq!(loaded.logs[0].id, kept_id);
    }

    #[tokio::test]
    async fn test_save_changes_type() {
        let pool = init_memory_database().await.unwrap();
        save(&pool, &work_entry(date(18))).await.unwrap();
        save(&pool, &CalendarEntry::new(date(18), CalendarEntryType::Sick)).await.unwrap();

        let loaded = get_by_date(&pool, date(18)).await.unwrap().unwrap();
        assert_eq!(loaded.entry_type, CalendarEntryType::Sick);
        assert!(loaded.logs.is_empty());
    }

    #[tokio::test]
    async fn test_range_query_is_ordered_and_inclusive() {
        let pool = init_memory_database().await.unwrap();
        let entries = vec![
            CalendarEntry::new(date(22), CalendarEntryType::Vacation),
            work_entry(date(18)),
            CalendarEntry::new(date(25), CalendarEntryType::Holiday),
            CalendarEntry::new(date(15), CalendarEntryType::Sick),
        ];
        save_all(&pool, &entries).await.unwrap();

        let loaded = get_by_date_range(&pool, date(18), date(22)).await.unwrap();
        let days: Vec<_> = loaded.keys().copied().collect();
        assert_eq!(days, vec![date(18), date(22)]);
        assert_eq!(loaded[&date(18)].logs.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_entries() {
        let pool = init_memory_database().await.unwrap();
        save_all(
            &pool,
            &[work_entry(date(18)), CalendarEntry::new(date(19), CalendarEntryType::Vacation)],
        )
        .await
        .unwrap();

        assert!(delete(&pool, date(18)).await.unwrap());
        assert!(!delete(&pool, date(18)).await.unwrap());
        assert_eq!(delete_all(&pool, &[date(19), date(20)]).await.unwrap(), 1);

        let logs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM time_log")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(logs, 0);
    }
}
