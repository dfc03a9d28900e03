//! Work time statistics and labor compliance
//!
//! Aggregates calendar entries into type counts, total work time and the
//! flextime balance, and checks each work day against the configured labor
//! rules:
//! - Maximum daily work time
//! - Tiered minimum breaks (short break above the lower threshold, extended
//!   break above the upper threshold)
//! - Minimum rest period between consecutive work days

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::human_time::{format_duration_hms, serde_duration};
use crate::models::{CalendarEntry, CalendarEntryType};

/// Labor rules used by the statistics calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    #[serde(with = "serde_duration")]
    pub standard_work_hours: Duration,
    #[serde(with = "serde_duration")]
    pub max_work_hours: Duration,
    /// Work time from which the short break is required
    #[serde(with = "serde_duration")]
    pub min_break_threshold: Duration,
    #[serde(with = "serde_duration")]
    pub min_break_duration: Duration,
    /// Work time from which the extended break is required
    #[serde(with = "serde_duration")]
    pub max_break_threshold: Duration,
    #[serde(with = "serde_duration")]
    pub max_break_duration: Duration,
    #[serde(with = "serde_duration")]
    pub min_rest_period: Duration,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            standard_work_hours: Duration::hours(8),
            max_work_hours: Duration::hours(10),
            min_break_threshold: Duration::hours(6),
            min_break_duration: Duration::minutes(30),
            max_break_threshold: Duration::hours(9),
            max_break_duration: Duration::minutes(45),
            min_rest_period: Duration::hours(11),
        }
    }
}

/// Kind of compliance violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    #[serde(rename = "max_work_hours_exceeded")]
    MaxHours,
    #[serde(rename = "break_time_violation")]
    BreakTime,
    #[serde(rename = "insufficient_rest_period")]
    RestPeriod,
}

/// A single compliance violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceViolation {
    pub day: NaiveDate,
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub details: String,
}

impl ComplianceViolation {
    fn new(day: NaiveDate, violation_type: ViolationType, details: String) -> Self {
        Self {
            day,
            violation_type,
            details,
        }
    }
}

/// Number of entries per type, plus the number of days with travel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub work: u32,
    pub flex_days: u32,
    pub vacation: u32,
    pub holiday: u32,
    pub sick: u32,
    pub travel: u32,
}

/// Aggregated statistics over a sequence of entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub entry_counts: TypeCount,
    #[serde(with = "serde_duration")]
    pub total_work_hours: Duration,
    #[serde(with = "serde_duration")]
    pub flextime_balance: Duration,
    pub compliance_violations: Vec<ComplianceViolation>,
}

/// Computes statistics and compliance violations under one configuration
#[derive(Debug, Clone, Default)]
pub struct StatisticsService {
    pub config: StatisticsConfig,
}

impl StatisticsService {
    pub fn new(config: StatisticsConfig) -> Self {
        Self { config }
    }

    /// Flextime of a single entry.
    ///
    /// `None` for vacation, holiday and sick days. A flextime day consumes a
    /// full standard day; a work day yields its duration minus the standard.
    pub fn calculate_flextime(&self, entry: &CalendarEntry) -> Option<Duration> {
        match entry.entry_type {
            CalendarEntryType::Flextime => Some(-self.config.standard_work_hours),
            CalendarEntryType::Work => entry
                .duration()
                .map(|duration| duration - self.config.standard_work_hours),
            _ => None,
        }
    }

    /// Check an entry for violations. The rest period is only checked when
    /// the previous entry is given.
    pub fn compliance_check(
        &self,
        entry: &CalendarEntry,
        previous: Option<&CalendarEntry>,
    ) -> Vec<ComplianceViolation> {
        if !entry.is_work() {
            return Vec::new();
        }

        let mut violations = self.check_daily_compliance(entry);
        if let Some(previous) = previous {
            violations.extend(self.check_rest_period(previous, entry));
        }
        violations
    }

    /// Single pass over chronologically ordered entries
    pub fn calculate_statistics<'a, I>(&self, entries: I) -> Statistics
    where
        I: IntoIterator<Item = &'a CalendarEntry>,
    {
        let mut counts = TypeCount::default();
        let mut total = Duration::zero();
        let mut work_days: i32 = 0;
        let mut violations = Vec::new();
        let mut previous: Option<&CalendarEntry> = None;

        for entry in entries {
            match entry.entry_type {
                CalendarEntryType::Work => counts.work += 1,
                CalendarEntryType::Flextime => counts.flex_days += 1,
                CalendarEntryType::Vacation => counts.vacation += 1,
                CalendarEntryType::Holiday => counts.holiday += 1,
                CalendarEntryType::Sick => counts.sick += 1,
            }

            if entry.has_travel() {
                counts.travel += 1;
            }

            if matches!(
                entry.entry_type,
                CalendarEntryType::Work | CalendarEntryType::Flextime
            ) {
                work_days += 1;
                if let Some(duration) = entry.duration().filter(|d| *d != Duration::zero()) {
                    total = total + duration;
                    violations.extend(self.compliance_check(entry, previous));
                }
            }

            previous = Some(entry);
        }

        Statistics {
            entry_counts: counts,
            total_work_hours: total,
            flextime_balance: total - self.config.standard_work_hours * work_days,
            compliance_violations: violations,
        }
    }

    /// Maximum work time and break rules of a single day
    pub fn check_daily_compliance(&self, entry: &CalendarEntry) -> Vec<ComplianceViolation> {
        let config = &self.config;
        let work = entry.duration().unwrap_or_else(Duration::zero);
        let pause = entry.pause_time().unwrap_or_else(Duration::zero);
        let mut violations = Vec::new();

        if work > config.max_work_hours {
            violations.push(ComplianceViolation::new(
                entry.day,
                ViolationType::MaxHours,
                format!(
                    "Worked {} exceeding maximum of {}",
                    format_duration_hms(work),
                    format_duration_hms(config.max_work_hours)
                ),
            ));
        }

        if work >= config.max_break_threshold {
            if pause < config.max_break_duration {
                violations.push(ComplianceViolation::new(
                    entry.day,
                    ViolationType::BreakTime,
                    format!(
                        "Insufficient extended break {} for duration {}",
                        format_duration_hms(pause),
                        format_duration_hms(work)
                    ),
                ));
            }
        } else if work >= config.min_break_threshold && pause < config.min_break_duration {
            violations.push(ComplianceViolation::new(
                entry.day,
                ViolationType::BreakTime,
                format!(
                    "Insufficient break {} for duration {}",
                    format_duration_hms(pause),
                    format_duration_hms(work)
                ),
            ));
        }

        violations
    }

    /// Rest between the last work log of `previous` and the first work log
    /// of `current`. No check when either side has no work logs.
    pub fn check_rest_period(
        &self,
        previous: &CalendarEntry,
        current: &CalendarEntry,
    ) -> Option<ComplianceViolation> {
        let last = previous.work_logs().last()?;
        let first = current.work_logs().next()?;

        let Some(last_end) = last.end else {
            return Some(ComplianceViolation::new(
                previous.day,
                ViolationType::RestPeriod,
                "Cannot check rest period: Previous work day has an open-ended work log"
                    .to_string(),
            ));
        };

        let rest = NaiveDateTime::new(current.day, first.start)
            .signed_duration_since(NaiveDateTime::new(previous.day, last_end));

        (rest < self.config.min_rest_period).then(|| {
            ComplianceViolation::new(
                current.day,
                ViolationType::RestPeriod,
                format!(
                    "Rest period of {} is less than required {}",
                    format_duration_hms(rest),
                    format_duration_hms(self.config.min_rest_period)
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeLog, TimeLogType};
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, d).unwrap()
    }

    fn log(log_type: TimeLogType, start: NaiveTime, end: NaiveTime, pause_min: i64) -> TimeLog {
        TimeLog::new(log_type, start, Some(end), Duration::minutes(pause_min)).unwrap()
    }

    fn work_day(day: NaiveDate, logs: Vec<TimeLog>) -> CalendarEntry {
        let mut entry = CalendarEntry::new(day, CalendarEntryType::Work);
        entry.logs = logs;
        entry
    }

    fn single(day: NaiveDate, start: NaiveTime, end: NaiveTime, pause_min: i64) -> CalendarEntry {
        work_day(day, vec![log(TimeLogType::Work, start, end, pause_min)])
    }

    fn service() -> StatisticsService {
        StatisticsService::default()
    }

    fn types(violations: &[ComplianceViolation]) -> Vec<ViolationType> {
        violations.iter().map(|v| v.violation_type).collect()
    }

    #[test]
    fn test_default_configuration() {
        let config = StatisticsConfig::default();
        assert_eq!(config.standard_work_hours, Duration::hours(8));
        assert_eq!(config.max_work_hours, Duration::hours(10));
        assert_eq!(config.min_break_threshold, Duration::hours(6));
        assert_eq!(config.min_break_duration, Duration::minutes(30));
        assert_eq!(config.max_break_threshold, Duration::hours(9));
        assert_eq!(config.max_break_duration, Duration::minutes(45));
        assert_eq!(config.min_rest_period, Duration::hours(11));
    }

    #[test]
    fn test_configuration_partial_toml() {
        let config: StatisticsConfig = toml::from_str(
            r#"
            standard_work_hours = "07:30"
            min_rest_period = 43200
            "#,
        )
        .unwrap();

        assert_eq!(config.standard_work_hours, Duration::minutes(450));
        assert_eq!(config.min_rest_period, Duration::hours(12));
        assert_eq!(config.max_work_hours, Duration::hours(10));
    }

    #[test]
    fn test_flextime_overtime_and_undertime() {
        let svc = service();
        assert_eq!(
            svc.calculate_flextime(&single(date(18), t(8, 0), t(19, 0), 30)),
            Some(Duration::minutes(150))
        );
        assert_eq!(
            svc.calculate_flextime(&single(date(18), t(9, 0), t(15, 0), 0)),
            Some(-Duration::hours(2))
        );
        assert_eq!(
            svc.calculate_flextime(&single(date(18), t(9, 0), t(17, 30), 30)),
            Some(Duration::zero())
        );
    }

    #[test]
    fn test_flextime_for_other_entry_types() {
        let svc = service();
        for entry_type in [
            CalendarEntryType::Vacation,
            CalendarEntryType::Holiday,
            CalendarEntryType::Sick,
        ] {
            assert_eq!(svc.calculate_flextime(&CalendarEntry::new(date(18), entry_type)), None);
        }

        let flex = CalendarEntry::new(date(18), CalendarEntryType::Flextime);
        assert_eq!(svc.calculate_flextime(&flex), Some(-Duration::hours(8)));
    }

    #[test]
    fn test_flextime_with_custom_configuration() {
        let svc = StatisticsService::new(StatisticsConfig {
            standard_work_hours: Duration::minutes(450),
            ..Default::default()
        });
        assert_eq!(
            svc.calculate_flextime(&single(date(18), t(9, 0), t(17, 30), 30)),
            Some(Duration::minutes(30))
        );
    }

    #[test]
    fn test_compliant_day_has_no_violations() {
        let entry = single(date(18), t(9, 0), t(17, 30), 30);
        assert!(service().compliance_check(&entry, None).is_empty());
    }

    #[test]
    fn test_max_hours_violation_includes_break_violation() {
        let entry = single(date(18), t(7, 0), t(18, 0), 0);
        let violations = service().compliance_check(&entry, None);

        assert_eq!(types(&violations), vec![ViolationType::MaxHours, ViolationType::BreakTime]);
        assert_eq!(violations[0].details, "Worked 11:00:00 exceeding maximum of 10:00:00");
    }

    #[test]
    fn test_short_break_violation() {
        let entry = single(date(18), t(9, 0), t(16, 0), 15);
        let violations = service().compliance_check(&entry, None);

        assert_eq!(types(&violations), vec![ViolationType::BreakTime]);
        assert!(violations[0].details.starts_with("Insufficient break"));
    }

    #[test]
    fn test_extended_break_violation() {
        let entry = single(date(18), t(8, 0), t(18, 0), 30);
        let violations = service().compliance_check(&entry, None);

        assert_eq!(types(&violations), vec![ViolationType::BreakTime]);
        assert!(violations[0].details.starts_with("Insufficient extended break"));
    }

    #[test]
    fn test_break_thresholds_are_inclusive() {
        // Exactly six hours without a break
        let six = single(date(18), t(9, 0), t(15, 0), 0);
        assert_eq!(types(&service().compliance_check(&six, None)), vec![ViolationType::BreakTime]);

        // Exactly nine hours with a short break only
        let nine = single(date(18), t(8, 0), t(17, 30), 30);
        assert_eq!(types(&service().compliance_check(&nine, None)), vec![ViolationType::BreakTime]);
    }

    #[test]
    fn test_sufficient_breaks_accepted() {
        let short = single(date(18), t(9, 0), t(16, 0), 30);
        assert!(service().compliance_check(&short, None).is_empty());

        let extended = single(date(18), t(8, 0), t(17, 45), 45);
        assert!(service().compliance_check(&extended, None).is_empty());
    }

    #[test]
    fn test_gap_between_logs_counts_as_break() {
        let entry = work_day(
            date(18),
            vec![
                log(TimeLogType::Work, t(8, 0), t(12, 0), 0),
                log(TimeLogType::Work, t(12, 30), t(15, 0), 0),
            ],
        );
        assert!(service().compliance_check(&entry, None).is_empty());
    }

    #[test]
    fn test_zero_duration_day_is_compliant() {
        let entry = work_day(date(18), vec![]);
        assert!(service().compliance_check(&entry, None).is_empty());
    }

    #[test]
    fn test_non_work_entry_is_not_checked() {
        let entry = CalendarEntry::new(date(18), CalendarEntryType::Vacation);
        let previous = single(date(17), t(9, 0), t(23, 0), 60);
        assert!(service().compliance_check(&entry, Some(&previous)).is_empty());
    }

    #[test]
    fn test_custom_max_hours() {
        let svc = StatisticsService::new(StatisticsConfig {
            max_work_hours: Duration::hours(8),
            ..Default::default()
        });
        let entry = single(date(18), t(8, 0), t(17, 0), 30);
        assert!(types(&svc.compliance_check(&entry, None)).contains(&ViolationType::MaxHours));
    }

    #[test]
    fn test_sufficient_rest_period() {
        let previous = single(date(18), t(9, 0), t(17, 30), 30);
        let current = single(date(19), t(9, 0), t(17, 30), 30);
        assert_eq!(service().check_rest_period(&previous, &current), None);
    }

    #[test]
    fn test_insufficient_rest_period() {
        let previous = single(date(18), t(14, 0), t(23, 0), 60);
        let current = single(date(19), t(7, 0), t(12, 0), 0);
        let violation = service().check_rest_period(&previous, &current).unwrap();

        assert_eq!(violation.violation_type, ViolationType::RestPeriod);
        assert_eq!(violation.day, date(19));
        assert_eq!(
            violation.details,
            "Rest period of 08:00:00 is less than required 11:00:00"
        );
    }

    #[test]
    fn test_exact_minimum_rest_period() {
        let previous = single(date(18), t(12, 0), t(20, 0), 0);
        let current = single(date(19), t(7, 0), t(12, 0), 0);
        assert_eq!(service().check_rest_period(&previous, &current), None);
    }

    #[test]
    fn test_open_ended_previous_log() {
        let mut previous = work_day(date(18), vec![]);
        previous.logs.push(TimeLog::new(TimeLogType::Work, t(9, 0), None, Duration::zero()).unwrap());
        let current = single(date(19), t(9, 0), t(17, 0), 30);

        let violation = service().check_rest_period(&previous, &current).unwrap();
        assert_eq!(violation.day, date(18));
        assert!(violation.details.contains("open-ended"));
    }

    #[test]
    fn test_no_rest_check_without_work_logs() {
        let empty = work_day(date(18), vec![]);
        let full = single(date(19), t(6, 0), t(12, 0), 0);
        assert_eq!(service().check_rest_period(&empty, &full), None);
        assert_eq!(service().check_rest_period(&full, &empty), None);
    }

    #[test]
    fn test_rest_period_ignores_travel_logs() {
        let previous = work_day(
            date(18),
            vec![
                log(TimeLogType::Work, t(8, 0), t(16, 0), 30),
                log(TimeLogType::Travel, t(16, 0), t(23, 0), 0),
            ],
        );
        let current = work_day(
            date(19),
            vec![
                log(TimeLogType::Travel, t(5, 0), t(8, 0), 0),
                log(TimeLogType::Work, t(8, 0), t(16, 0), 30),
            ],
        );
        assert_eq!(service().check_rest_period(&previous, &current), None);
    }

    #[test]
    fn test_rest_period_uses_last_and_first_work_logs() {
        let previous = work_day(
            date(18),
            vec![
                log(TimeLogType::Work, t(8, 0), t(12, 0), 0),
                log(TimeLogType::Work, t(18, 0), t(22, 0), 0),
            ],
        );
        let current = work_day(
            date(19),
            vec![
                log(TimeLogType::Work, t(6, 0), t(8, 0), 0),
                log(TimeLogType::Work, t(12, 0), t(16, 0), 0),
            ],
        );
        assert!(service().check_rest_period(&previous, &current).is_some());
    }

    #[test]
    fn test_compliance_check_with_rest_violation() {
        let previous = single(date(18), t(12, 0), t(23, 0), 60);
        let current = single(date(19), t(6, 0), t(18, 0), 60);
        let violations = service().compliance_check(&current, Some(&previous));

        let found = types(&violations);
        assert!(found.contains(&ViolationType::MaxHours));
        assert!(found.contains(&ViolationType::RestPeriod));
    }

    #[test]
    fn test_statistics_for_empty_input() {
        let stats = service().calculate_statistics(&Vec::new());
        assert_eq!(stats.entry_counts, TypeCount::default());
        assert_eq!(stats.total_work_hours, Duration::zero());
        assert_eq!(stats.flextime_balance, Duration::zero());
        assert!(stats.compliance_violations.is_empty());
    }

    #[test]
    fn test_statistics_counts_and_balance() {
        let entries = vec![
            single(date(18), t(9, 0), t(17, 30), 30),
            single(date(19), t(8, 0), t(18, 0), 60),
            CalendarEntry::new(date(20), CalendarEntryType::Flextime),
            CalendarEntry::new(date(21), CalendarEntryType::Vacation),
            CalendarEntry::new(date(22), CalendarEntryType::Sick),
            CalendarEntry::new(date(25), CalendarEntryType::Holiday),
            work_day(
                date(26),
                vec![
                    log(TimeLogType::Travel, t(6, 0), t(8, 0), 0),
                    log(TimeLogType::Work, t(8, 0), t(12, 0), 0),
                ],
            ),
        ];
        let stats = service().calculate_statistics(&entries);

        assert_eq!(
            stats.entry_counts,
            TypeCount {
                work: 3,
                flex_days: 1,
                vacation: 1,
                holiday: 1,
                sick: 1,
                travel: 1,
            }
        );
        // 8h + 9h + 4h worked against four expected days
        assert_eq!(stats.total_work_hours, Duration::hours(21));
        assert_eq!(stats.flextime_balance, Duration::hours(21) - Duration::hours(32));
        assert!(stats.compliance_violations.is_empty());
    }

    #[test]
    fn test_statistics_skip_compliance_for_empty_work_days() {
        let entries = vec![
            single(date(18), t(14, 0), t(23, 0), 60),
            work_day(date(19), vec![]),
        ];
        let stats = service().calculate_statistics(&entries);

        assert!(stats.compliance_violations.is_empty());
        assert_eq!(stats.flextime_balance, Duration::hours(8) - Duration::hours(16));
    }

    #[test]
    fn test_statistics_rest_period_across_days() {
        let entries = vec![
            single(date(18), t(14, 0), t(23, 0), 60),
            single(date(19), t(7, 0), t(12, 0), 0),
        ];
        let stats = service().calculate_statistics(&entries);

        assert_eq!(types(&stats.compliance_violations), vec![ViolationType::RestPeriod]);
        assert_eq!(stats.compliance_violations[0].day, date(19));
    }

    #[test]
    fn test_statistics_previous_entry_tracked_for_any_type() {
        // A vacation day in between resets the rest period comparison
        let entries = vec![
            single(date(18), t(14, 0), t(23, 0), 60),
            CalendarEntry::new(date(19), CalendarEntryType::Vacation),
            single(date(20), t(6, 0), t(12, 0), 30),
        ];
        let stats = service().calculate_statistics(&entries);
        assert!(stats.compliance_violations.is_empty());
    }

    #[test]
    fn test_statistics_json_shape() {
        let stats = service().calculate_statistics(&[single(date(18), t(7, 0), t(18, 0), 0)]);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["total_work_hours"], "11:00:00");
        assert_eq!(json["flextime_balance"], "03:00:00");
        assert_eq!(json["entry_counts"]["work"], 1);
        assert_eq!(json["compliance_violations"][0]["type"], "max_work_hours_exceeded");
        assert_eq!(json["compliance_violations"][0]["day"], "2024-11-18");
    }
}
