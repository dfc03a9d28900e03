//! # Clocker Common Library
//!
//! Shared code for the clocker work-time tracker:
//! - Calendar entry and time log models
//! - Time log validation and editing
//! - Labor-compliance statistics and flextime balances
//! - Calendar service and German public holidays
//! - Database schema and entry persistence
//! - Configuration loading
//! - Human-readable time formatting

pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod holidays;
pub mod human_time;
pub mod models;
pub mod statistics;
pub mod time;
pub mod time_log;
pub mod time_logger;

pub use calendar::Calendar;
pub use error::{Error, Result};
pub use models::{CalendarEntry, CalendarEntryType, TimeLog, TimeLogType};
pub use statistics::{StatisticsConfig, StatisticsService};
pub use time_log::TimeLogError;
