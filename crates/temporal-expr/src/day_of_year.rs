//! "Every year on a fixed month and day": December 31, every other February 2.
//!
//! A February 29 pattern still fires once in non-leap years, on March 1.
//! The frequency is a stride in calendar years from the start year.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;

use crate::calendar::{self, GREGORIAN_CYCLE_YEARS};
use crate::error::{Result, TemporalError};
use crate::pattern::{Bounds, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOfYear {
    day: u32,
    month: u32,
    /// Zone used to turn absolute instants into calendar dates.
    timezone: Tz,
}

impl DayOfYear {
    pub fn new(day: u32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TemporalError::field(
                "month",
                format!("expected a month within 1..=12, got {}", month),
            ));
        }
        if !(1..=31).contains(&day) {
            return Err(TemporalError::field(
                "day",
                format!("expected a day within 1..=31, got {}", day),
            ));
        }
        Ok(Self {
            day,
            month,
            timezone: Tz::UTC,
        })
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn is_leap_day(&self) -> bool {
        self.month == 2 && self.day == 29
    }

    fn date_matches(&self, date: NaiveDate) -> bool {
        let exact = date.month() == self.month && date.day() == self.day;
        let leap_fallback = self.is_leap_day()
            && !calendar::is_leap_year(date.year())
            && date.month() == 3
            && date.day() == 1;
        exact || leap_fallback
    }

    /// The date this pattern falls on in `year`, if the year has one.
    fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).or_else(|| {
            if self.is_leap_day() {
                NaiveDate::from_ymd_opt(year, 3, 1)
            } else {
                None
            }
        })
    }
}

impl Rule for DayOfYear {
    fn matches(&self, date: NaiveDate, bounds: &Bounds) -> bool {
        self.date_matches(date)
            && calendar::years_between(bounds.start, date).rem_euclid(bounds.frequency()) == 0
    }

    fn next_after(&self, after: NaiveDate, bounds: &Bounds) -> Option<NaiveDate> {
        let frequency = bounds.frequency();
        let mut year = i64::from(after.year());

        for _ in 0..GREGORIAN_CYCLE_YEARS {
            let misalignment = (year - i64::from(bounds.start.year())).rem_euclid(frequency);
            if misalignment != 0 {
                year += frequency - misalignment;
            }
            let year_i32 = i32::try_from(year).ok()?;
            if bounds.past_end(NaiveDate::from_ymd_opt(year_i32, 1, 1)?) {
                return None;
            }

            if let Some(candidate) = self.in_year(year_i32) {
                if bounds.past_end(candidate) {
                    return None;
                }
                if candidate > after && self.includes(candidate, bounds) {
                    return Some(candidate);
                }
            }

            year += 1;
        }

        tracing::debug!(%after, "no occurrence within a Gregorian cycle of aligned years");
        None
    }
}
