//! German public holidays
//!
//! Fixed-date and Easter-based holidays per federal state. Easter Sunday is
//! computed with the anonymous Gregorian algorithm.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::{Error, Result};

/// German federal state, identified by its two-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FederalState {
    BW,
    BY,
    BE,
    BB,
    HB,
    HH,
    HE,
    MV,
    NI,
    NW,
    RP,
    SL,
    SN,
    ST,
    SH,
    TH,
}

impl FederalState {
    pub const ALL: [FederalState; 16] = [
        FederalState::BW,
        FederalState::BY,
        FederalState::BE,
        FederalState::BB,
        FederalState::HB,
        FederalState::HH,
        FederalState::HE,
        FederalState::MV,
        FederalState::NI,
        FederalState::NW,
        FederalState::RP,
        FederalState::SL,
        FederalState::SN,
        FederalState::ST,
        FederalState::SH,
        FederalState::TH,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            FederalState::BW => "BW",
            FederalState::BY => "BY",
            FederalState::BE => "BE",
            FederalState::BB => "BB",
            FederalState::HB => "HB",
            FederalState::HH => "HH",
            FederalState::HE => "HE",
            FederalState::MV => "MV",
            FederalState::NI => "NI",
            FederalState::NW => "NW",
            FederalState::RP => "RP",
            FederalState::SL => "SL",
            FederalState::SN => "SN",
            FederalState::ST => "ST",
            FederalState::SH => "SH",
            FederalState::TH => "TH",
        }
    }

    fn is_one_of(&self, states: &[FederalState]) -> bool {
        states.contains(self)
    }
}

impl fmt::Display for FederalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FederalState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        FederalState::ALL
            .iter()
            .copied()
            .find(|state| state.code() == code)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown federal state: {}", s)))
    }
}

/// A public holiday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub day: NaiveDate,
    pub name: &'static str,
}

/// Easter Sunday of the given year
pub fn easter_sunday(year: i32) -> Result<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| Error::InvalidInput(format!("Invalid year: {}", year)))
}

/// Wednesday before 23 November
fn repentance_day(year: i32) -> Result<NaiveDate> {
    let reference = fixed(year, 11, 22)?;
    let offset = (reference.weekday().num_days_from_monday() + 7
        - Weekday::Wed.num_days_from_monday())
        % 7;
    Ok(reference - Duration::days(offset as i64))
}

fn fixed(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::InvalidInput(format!("Invalid year: {}", year)))
}

/// Public holidays of a year in the given state, ordered by date
pub fn public_holidays(year: i32, state: FederalState) -> Result<Vec<Holiday>> {
    use FederalState::*;

    let easter = easter_sunday(year)?;
    let after_easter = |days: i64| easter + Duration::days(days);
    let mut holidays = vec![
        Holiday { day: fixed(year, 1, 1)?, name: "Neujahr" },
        Holiday { day: after_easter(-2), name: "Karfreitag" },
        Holiday { day: after_easter(1), name: "Ostermontag" },
        Holiday { day: fixed(year, 5, 1)?, name: "Erster Mai" },
        Holiday { day: after_easter(39), name: "Christi Himmelfahrt" },
        Holiday { day: after_easter(50), name: "Pfingstmontag" },
        Holiday { day: fixed(year, 10, 3)?, name: "Tag der Deutschen Einheit" },
        Holiday { day: fixed(year, 12, 25)?, name: "Erster Weihnachtstag" },
        Holiday { day: fixed(year, 12, 26)?, name: "Zweiter Weihnachtstag" },
    ];

    if state == BB {
        holidays.push(Holiday { day: easter, name: "Ostersonntag" });
        holidays.push(Holiday { day: after_easter(49), name: "Pfingstsonntag" });
    }

    if state.is_one_of(&[BW, BY, ST]) {
        holidays.push(Holiday { day: fixed(year, 1, 6)?, name: "Heilige Drei Könige" });
    }

    if (state == BE && year >= 2019) || (state == MV && year >= 2023) {
        holidays.push(Holiday { day: fixed(year, 3, 8)?, name: "Internationaler Frauentag" });
    }

    if state.is_one_of(&[BW, BY, HE, NW, RP, SL]) {
        holidays.push(Holiday { day: after_easter(60), name: "Fronleichnam" });
    }

    if state == SL {
        holidays.push(Holiday { day: fixed(year, 8, 15)?, name: "Mariä Himmelfahrt" });
    }

    if state == TH && year >= 2019 {
        holidays.push(Holiday { day: fixed(year, 9, 20)?, name: "Weltkindertag" });
    }

    let reformation = year == 2017
        || state.is_one_of(&[BB, MV, SN, ST, TH])
        || (year >= 2018 && state.is_one_of(&[HB, HH, NI, SH]));
    if reformation {
        holidays.push(Holiday { day: fixed(year, 10, 31)?, name: "Reformationstag" });
    }

    if state.is_one_of(&[BW, BY, NW, RP, SL]) {
        holidays.push(Holiday { day: fixed(year, 11, 1)?, name: "Allerheiligen" });
    }

    if state == SN {
        holidays.push(Holiday { day: repentance_day(year)?, name: "Buß- und Bettag" });
    }

    holidays.sort_by_key(|holiday| holiday.day);
    Ok(holidays)
}
