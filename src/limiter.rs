use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

use crate::date::CalendarDate;
use crate::error::{Error, ErrorKind, Result};

/// Decides which dates the cursor of a dialog may rest on.
pub trait DateRangeLimiter {
    fn min_year(&self) -> i32;
    fn max_year(&self) -> i32;
    fn start_date(&self) -> CalendarDate;
    fn end_date(&self) -> CalendarDate;
    fn is_out_of_range(&self, date: &CalendarDate) -> bool;

    /// Returns `date` itself if it is selectable, the closest selectable date
    /// otherwise.
    fn set_to_nearest_date(&self, date: CalendarDate) -> CalendarDate;

    /// Returns `date` itself if it is selectable, otherwise the first
    /// selectable date reached when moving on from `date` forwards (or
    /// backwards). Falls back to the closest selectable date if there is
    /// none in that direction.
    fn set_to_next_date(&self, date: CalendarDate, _forwards: bool) -> CalendarDate {
        self.set_to_nearest_date(date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultDateRangeLimiter {
    min_year: i32,
    max_year: i32,
    min_date: Option<CalendarDate>,
    max_date: Option<CalendarDate>,
    selectable_days: BTreeSet<CalendarDate>,
    disabled_days: BTreeSet<CalendarDate>,
}

impl Default for DefaultDateRangeLimiter {
    fn default() -> Self {
        DefaultDateRangeLimiter {
            min_year: NaiveDate::MIN.year(),
            max_year: NaiveDate::MAX.year(),
            min_date: None,
            max_date: None,
            selectable_days: BTreeSet::new(),
            disabled_days: BTreeSet::new(),
        }
    }
}

impl DefaultDateRangeLimiter {
    pub fn with_year_range(mut self, start_year: i32, end_year: i32) -> Result<Self> {
        if end_year < start_year {
            return Err(Error::new(
                ErrorKind::InvalidRange,
                &format!(
                    "year end {} must not be before year start {}",
                    end_year, start_year
                ),
            ));
        }
        self.min_year = start_year.max(NaiveDate::MIN.year());
        self.max_year = end_year.min(NaiveDate::MAX.year());
        self.checked()
    }

    pub fn with_min_date(mut self, date: CalendarDate) -> Result<Self> {
        if let Some(max) = self.max_date {
            if max < date {
                return Err(Error::new(
                    ErrorKind::InvalidRange,
                    &format!("min date {} is after max date {}", date, max),
                ));
            }
        }
        self.min_date = Some(date);
        self.checked()
    }

    pub fn with_max_date(mut self, date: CalendarDate) -> Result<Self> {
        if let Some(min) = self.min_date {
            if date < min {
                return Err(Error::new(
                    ErrorKind::InvalidRange,
                    &format!("max date {} is before min date {}", date, min),
                ));
            }
        }
        self.max_date = Some(date);
        self.checked()
    }

    pub fn with_selectable_days<I: IntoIterator<Item = CalendarDate>>(mut self, days: I) -> Self {
        self.selectable_days = days.into_iter().collect();
        self
    }

    pub fn with_disabled_days<I: IntoIterator<Item = CalendarDate>>(mut self, days: I) -> Self {
        self.disabled_days = days.into_iter().collect();
        self
    }

    /// Fails if the year range and the min/max dates leave no date at all.
    fn checked(self) -> Result<Self> {
        let (lower, upper) = (self.lower_bound(), self.upper_bound());
        if upper < lower {
            return Err(Error::new(
                ErrorKind::InvalidRange,
                &format!("no date lies between {} and {}", lower, upper),
            ));
        }
        Ok(self)
    }

    fn lower_bound(&self) -> CalendarDate {
        let year_start = CalendarDate::new(self.min_year, 0, 1)
            .unwrap_or_else(|_| CalendarDate::from(NaiveDate::MIN));
        self.min_date.map_or(year_start, |min| min.max(year_start))
    }

    fn upper_bound(&self) -> CalendarDate {
        let year_end = CalendarDate::new(self.max_year, 11, 31)
            .unwrap_or_else(|_| CalendarDate::from(NaiveDate::MAX));
        self.max_date.map_or(year_end, |max| max.min(year_end))
    }

    fn is_before_min(&self, date: &CalendarDate) -> bool {
        *date < self.lower_bound()
    }

    fn is_after_max(&self, date: &CalendarDate) -> bool {
        *date > self.upper_bound()
    }

    fn is_disabled(&self, date: &CalendarDate) -> bool {
        self.disabled_days.contains(date)
    }

    fn nearest_selectable_day(&self, date: CalendarDate) -> Option<CalendarDate> {
        let candidates = || {
            self.selectable_days
                .iter()
                .filter(|d| !self.is_before_min(d) && !self.is_after_max(d))
                .filter(|d| !self.is_disabled(d))
        };
        let before = candidates().rev().find(|d| **d <= date);
        let after = candidates().find(|d| **d >= date);

        match (before, after) {
            (Some(b), Some(a)) => {
                let to_before = date.as_naive().signed_duration_since(b.as_naive());
                let to_after = a.as_naive().signed_duration_since(date.as_naive());
                Some(if to_after < to_before { *a } else { *b })
            }
            (b, a) => b.or(a).copied(),
        }
    }

    fn next_selectable_day(&self, date: CalendarDate, forwards: bool) -> Option<CalendarDate> {
        let mut candidates = self
            .selectable_days
            .iter()
            .filter(|d| !self.is_before_min(d) && !self.is_after_max(d))
            .filter(|d| !self.is_disabled(d));
        if forwards {
            candidates.find(|d| **d >= date).copied()
        } else {
            candidates.rev().find(|d| **d <= date).copied()
        }
    }

    fn next_enabled_day(&self, date: CalendarDate, forwards: bool) -> Option<CalendarDate> {
        let lower = self.lower_bound();
        let upper = self.upper_bound();

        let (mut next, step) = if forwards {
            (Some(date.max(lower)), 1)
        } else {
            (Some(date.min(upper)), -1)
        };
        while let Some(d) = next.filter(|d| *d >= lower && *d <= upper) {
            if !self.is_disabled(&d) {
                return Some(d);
            }
            next = d.add_days(step);
        }
        None
    }

    fn nearest_enabled_day(&self, date: CalendarDate) -> CalendarDate {
        let lower = self.lower_bound();
        let upper = self.upper_bound();
        let clamped = date.max(lower).min(upper);

        let mut forward = Some(clamped);
        let mut backward = Some(clamped);
        while forward.is_some() || backward.is_some() {
            if let Some(d) = backward {
                if !self.is_disabled(&d) {
                    return d;
                }
                backward = d.add_days(-1).filter(|d| *d >= lower);
            }
            if let Some(d) = forward {
                if !self.is_disabled(&d) {
                    return d;
                }
                forward = d.add_days(1).filter(|d| *d <= upper);
            }
        }

        log::warn!("Every day between {} and {} is disabled", lower, upper);
        clamped
    }
}

impl DateRangeLimiter for DefaultDateRangeLimiter {
    fn min_year(&self) -> i32 {
        self.selectable_days
            .iter()
            .next()
            .map_or(self.min_year, |first| first.year().max(self.min_year))
    }

    fn max_year(&self) -> i32 {
        self.selectable_days
            .iter()
            .next_back()
            .map_or(self.max_year, |last| last.year().min(self.max_year))
    }

    fn start_date(&self) -> CalendarDate {
        self.selectable_days
            .iter()
            .next()
            .map_or(self.lower_bound(), |first| (*first).max(self.lower_bound()))
    }

    fn end_date(&self) -> CalendarDate {
        self.selectable_days
            .iter()
            .next_back()
            .map_or(self.upper_bound(), |last| (*last).min(self.upper_bound()))
    }

    fn is_out_of_range(&self, date: &CalendarDate) -> bool {
        self.is_before_min(date)
            || self.is_after_max(date)
            || self.is_disabled(date)
            || (!self.selectable_days.is_empty() && !self.selectable_days.contains(date))
    }

    fn set_to_nearest_date(&self, date: CalendarDate) -> CalendarDate {
        if !self.is_out_of_range(&date) {
            return date;
        }

        if !self.selectable_days.is_empty() {
            if let Some(nearest) = self.nearest_selectable_day(date) {
                return nearest;
            }
            log::warn!("None of the selectable days lies within the allowed range");
        }

        self.nearest_enabled_day(date)
    }

    fn set_to_next_date(&self, date: CalendarDate, forwards: bool) -> CalendarDate {
        if !self.is_out_of_range(&date) {
            return date;
        }

        let next = if self.selectable_days.is_empty() {
            self.next_enabled_day(date, forwards)
        } else {
            self.next_selectable_day(date, forwards)
        };
        next.unwrap_or_else(|| self.set_to_nearest_date(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::new(year, month, day).unwrap()
    }

    #[test]
    fn unconfigured_limiter_accepts_everything() {
        let limiter = DefaultDateRangeLimiter::default();
        for d in [date(1, 0, 1), date(1900, 0, 1), date(2017, 11, 4), date(9999, 11, 31)] {
            assert!(!limiter.is_out_of_range(&d));
            assert_eq!(limiter.set_to_nearest_date(d), d);
        }
    }

    #[test]
    fn year_range_clamps_to_first_and_last_day() {
        let limiter = DefaultDateRangeLimiter::default()
            .with_year_range(2000, 2010)
            .unwrap();

        assert_eq!(limiter.min_year(), 2000);
        assert_eq!(limiter.max_year(), 2010);
        assert!(limiter.is_out_of_range(&date(1999, 11, 31)));
        assert_eq!(limiter.set_to_nearest_date(date(1990, 5, 5)), date(2000, 0, 1));
        assert_eq!(limiter.set_to_nearest_date(date(2017, 11, 4)), date(2010, 11, 31));

        assert!(matches!(
            DefaultDateRangeLimiter::default()
                .with_year_range(2010, 2000)
                .unwrap_err()
                .kind,
            ErrorKind::InvalidRange
        ));
    }

    #[test]
    fn min_and_max_dates() {
        let limiter = DefaultDateRangeLimiter::default()
            .with_min_date(date(2017, 11, 4))
            .unwrap()
            .with_max_date(date(2017, 11, 20))
            .unwrap();

        assert_eq!(limiter.start_date(), date(2017, 11, 4));
        assert_eq!(limiter.end_date(), date(2017, 11, 20));
        assert!(limiter.is_out_of_range(&date(2017, 11, 3)));
        assert!(!limiter.is_out_of_range(&date(2017, 11, 15)));
        assert_eq!(limiter.set_to_nearest_date(date(2017, 11, 25)), date(2017, 11, 20));

        assert!(DefaultDateRangeLimiter::default()
            .with_max_date(date(2017, 0, 1))
            .unwrap()
            .with_min_date(date(2017, 0, 2))
            .is_err());
    }

    #[test]
    fn disabled_days_are_skipped() {
        let limiter = DefaultDateRangeLimiter::default()
            .with_disabled_days(vec![date(2017, 11, 15), date(2017, 11, 14)]);

        assert!(limiter.is_out_of_range(&date(2017, 11, 15)));
        assert_eq!(limiter.set_to_nearest_date(date(2017, 11, 15)), date(2017, 11, 16));
        assert_eq!(limiter.set_to_nearest_date(date(2017, 11, 14)), date(2017, 11, 13));
    }

    #[test]
    fn stepping_skips_disabled_days() {
        let limiter = DefaultDateRangeLimiter::default()
            .with_disabled_days(vec![date(2017, 11, 14), date(2017, 11, 15)]);

        assert_eq!(limiter.set_to_next_date(date(2017, 11, 14), true), date(2017, 11, 16));
        assert_eq!(limiter.set_to_next_date(date(2017, 11, 15), false), date(2017, 11, 13));
        assert_eq!(limiter.set_to_next_date(date(2017, 11, 20), true), date(2017, 11, 20));
    }

    #[test]
    fn stepping_falls_back_to_nearest_at_the_range_end() {
        let limiter = DefaultDateRangeLimiter::default()
            .with_max_date(date(2017, 11, 31))
            .unwrap()
            .with_disabled_days(vec![date(2017, 11, 31)]);

        assert_eq!(limiter.set_to_next_date(date(2017, 11, 31), true), date(2017, 11, 30));
        assert_eq!(limiter.set_to_next_date(date(2018, 0, 5), true), date(2017, 11, 30));
    }

    #[test]
    fn stepping_reaches_far_selectable_days() {
        let limiter = DefaultDateRangeLimiter::default().with_selectable_days(vec![
            date(2017, 11, 1),
            date(2017, 11, 10),
        ]);

        assert_eq!(limiter.set_to_next_date(date(2017, 11, 2), true), date(2017, 11, 10));
        assert_eq!(limiter.set_to_next_date(date(2017, 11, 9), false), date(2017, 11, 1));
        assert_eq!(limiter.set_to_next_date(date(2017, 11, 11), true), date(2017, 11, 10));
    }

    #[test]
    fn year_range_and_dates_must_overlap() {
        let err = DefaultDateRangeLimiter::default()
            .with_year_range(2000, 2010)
            .unwrap()
            .with_min_date(date(2015, 0, 1))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidRange));

        let err = DefaultDateRangeLimiter::default()
            .with_max_date(date(1999, 5, 1))
            .unwrap()
            .with_year_range(2000, 2010)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidRange));

        assert!(DefaultDateRangeLimiter::default()
            .with_year_range(2000, 2010)
            .unwrap()
            .with_min_date(date(2010, 11, 31))
            .is_ok());
    }

    #[test]
    fn selectable_days_restrict_everything_else() {
        let limiter = DefaultDateRangeLimiter::default().with_selectable_days(vec![
            date(2017, 11, 1),
            date(2017, 11, 10),
            date(2018, 2, 3),
        ]);

        assert_eq!(limiter.min_year(), 2017);
        assert_eq!(limiter.max_year(), 2018);
        assert_eq!(limiter.start_date(), date(2017, 11, 1));
        assert_eq!(limiter.end_date(), date(2018, 2, 3));
        assert!(limiter.is_out_of_range(&date(2017, 11, 2)));
        assert_eq!(limiter.set_to_nearest_date(date(2017, 11, 4)), date(2017, 11, 1));
        assert_eq!(limiter.set_to_nearest_date(date(2017, 11, 8)), date(2017, 11, 10));
        assert_eq!(limiter.set_to_nearest_date(date(2020, 0, 1)), date(2018, 2, 3));
    }
}
