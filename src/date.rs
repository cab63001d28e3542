//! Calendar dates with a 0-based month index.
//!
//! Months are counted `0..=11` throughout the API so that `(2017, 11, 4)`
//! is the 4th of December 2017. Only the ISO text form (`2017-12-04`) uses
//! the 1-based month number.

use chrono::{Datelike, Duration, Local, Month, NaiveDate, Weekday};
use derive_more::Constructor;
use nom::{
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{pair, tuple},
    IResult,
};
use num_traits::FromPrimitive;
use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

pub const MONTHS_PER_YEAR: u32 = 12;
pub const DAYS_PER_WEEK: u32 = 7;
const MILLIS_PER_DAY: i64 = 86_400_000;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (0-based) of `year`, `0` for an invalid month.
pub fn days_of_month(month: u32, year: i32) -> u32 {
    match month {
        1 if is_leap_year(year) => 29,
        1 => 28,
        3 | 5 | 8 | 10 => 30,
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        _ => 0,
    }
}

/// An unvalidated `(year, month, day)` triple as handed over by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor, Deserialize)]
pub struct RawDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl RawDate {
    pub fn to_date(&self) -> Result<CalendarDate> {
        CalendarDate::new(self.year, self.month, self.day)
    }
}

impl From<CalendarDate> for RawDate {
    fn from(date: CalendarDate) -> Self {
        RawDate::new(date.year(), date.month(), date.day())
    }
}

fn parse_iso(input: &str) -> IResult<&str, (i32, u32, u32)> {
    let (rest, (year, _, month, _, day)) = all_consuming(tuple((
        map_res(recognize(pair(opt(char('-')), digit1)), i32::from_str),
        char('-'),
        map_res(digit1, u32::from_str),
        char('-'),
        map_res(digit1, u32::from_str),
    )))(input)?;

    Ok((rest, (year, month, day)))
}

impl FromStr for RawDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (_, (year, month, day)) = parse_iso(s.trim()).map_err(|_| {
            Error::new(
                ErrorKind::DateParse,
                &format!("'{}' is not of the form YYYY-MM-DD", s),
            )
        })?;

        let month = month.checked_sub(1).ok_or_else(|| {
            Error::new(ErrorKind::InvalidDate, &format!("month 0 in '{}'", s))
        })?;

        Ok(RawDate::new(year, month, day))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if month >= MONTHS_PER_YEAR {
            return Err(Error::new(
                ErrorKind::InvalidDate,
                &format!("month index {} is not within 0..=11", month),
            ));
        }

        NaiveDate::from_ymd_opt(year, month + 1, day)
            .map(CalendarDate)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidDate,
                    &format!(
                        "day {} does not exist in month {} of year {}",
                        day, month, year
                    ),
                )
            })
    }

    pub fn today() -> Self {
        CalendarDate(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month0()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn month_name(&self) -> &'static str {
        MonthIndex::of(self).name()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// `None` if the result is not representable.
    pub fn add_days(&self, days: i64) -> Option<Self> {
        // Duration stores milliseconds in an i64
        days.checked_mul(MILLIS_PER_DAY)?;
        self.0.checked_add_signed(Duration::days(days)).map(CalendarDate)
    }

    /// Moves by whole months, clamping the day to the length of the target
    /// month (Mar 31 + 1 month is Apr 30).
    pub fn add_months(&self, months: i32) -> Option<Self> {
        MonthIndex::of(self)
            .shifted(months)
            .and_then(|target| target.clamped_day(self.day()))
    }

    pub fn add_years(&self, years: i32) -> Option<Self> {
        years
            .checked_mul(MONTHS_PER_YEAR as i32)
            .and_then(|months| self.add_months(months))
    }

    pub fn with_year(&self, year: i32) -> Option<Self> {
        MonthIndex::new(year, self.month())
            .ok()
            .and_then(|target| target.clamped_day(self.day()))
    }

    pub fn with_month(&self, month: u32) -> Option<Self> {
        MonthIndex::new(self.year(), month)
            .ok()
            .and_then(|target| target.clamped_day(self.day()))
    }

    pub fn with_day(&self, day: u32) -> Result<Self> {
        CalendarDate::new(self.year(), self.month(), day)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        CalendarDate(date)
    }
}

impl TryFrom<RawDate> for CalendarDate {
    type Error = Error;

    fn try_from(raw: RawDate) -> Result<Self> {
        raw.to_date()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year(),
            self.month() + 1,
            self.day()
        )
    }
}

impl FromStr for CalendarDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RawDate::from_str(s)?.to_date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthIndex {
    year: i32,
    month: u32,
}

impl MonthIndex {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if month < MONTHS_PER_YEAR {
            Ok(MonthIndex { year, month })
        } else {
            Err(Error::new(
                ErrorKind::InvalidDate,
                &format!("month index {} is not within 0..=11", month),
            ))
        }
    }

    pub fn of(date: &CalendarDate) -> Self {
        MonthIndex {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn name(&self) -> &'static str {
        Month::from_u32(self.month + 1).map_or("", |m| m.name())
    }

    pub fn shifted(&self, months: i32) -> Option<Self> {
        let total =
            self.year as i64 * MONTHS_PER_YEAR as i64 + self.month as i64 + months as i64;
        let year = i32::try_from(total.div_euclid(MONTHS_PER_YEAR as i64)).ok()?;

        Some(MonthIndex {
            year,
            month: total.rem_euclid(MONTHS_PER_YEAR as i64) as u32,
        })
    }

    pub fn next(&self) -> Option<Self> {
        self.shifted(1)
    }

    pub fn prev(&self) -> Option<Self> {
        self.shifted(-1)
    }

    pub fn num_days(&self) -> u32 {
        days_of_month(self.month, self.year)
    }

    pub fn first_day(&self) -> Option<CalendarDate> {
        CalendarDate::new(self.year, self.month, 1).ok()
    }

    /// Day of this month for `day`, or its last day if the month is shorter.
    pub fn clamped_day(&self, day: u32) -> Option<CalendarDate> {
        CalendarDate::new(self.year, self.month, day.min(self.num_days()).max(1)).ok()
    }

    /// Number of empty cells before the 1st in a week row starting on
    /// `week_start`.
    pub fn leading_days(&self, week_start: Weekday) -> u32 {
        self.first_day().map_or(0, |first| {
            (first.weekday().num_days_from_monday() + DAYS_PER_WEEK
                - week_start.num_days_from_monday())
                % DAYS_PER_WEEK
        })
    }
}
