//! "The Nth weekday of every month": first Monday, third Tuesday, last Friday.
//!
//! A positive week counts occurrences from the start of the month, a negative
//! one from the end. The from-end rule mirrors the date within its month and
//! reuses the from-start week number, so the 29th of a 31-day month is in
//! week 1 counted from the end.

use chrono::NaiveDate;

use crate::calendar;
use crate::error::{Result, TemporalError};
use crate::pattern::{next_in_aligned_months, Bounds, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOfWeekOfMonth {
    /// ISO weekday, 1 = Monday .. 7 = Sunday.
    day_of_week: u32,
    week_of_month: i32,
}

impl DayOfWeekOfMonth {
    pub fn new(day_of_week: u32, week_of_month: i32) -> Result<Self> {
        if !(1..=7).contains(&day_of_week) {
            return Err(TemporalError::field(
                "day_of_week",
                format!("expected a weekday within 1..=7, got {}", day_of_week),
            ));
        }
        if week_of_month == 0 || week_of_month.unsigned_abs() > 6 {
            return Err(TemporalError::field(
                "week_of_month",
                format!("expected a nonzero week within -6..=6, got {}", week_of_month),
            ));
        }
        Ok(Self {
            day_of_week,
            week_of_month,
        })
    }

    pub fn day_of_week(&self) -> u32 {
        self.day_of_week
    }

    pub fn week_of_month(&self) -> i32 {
        self.week_of_month
    }

    pub fn from_end(&self) -> bool {
        self.week_of_month < 0
    }

    fn week_matches(&self, date: NaiveDate) -> bool {
        let week = if self.from_end() {
            calendar::mirrored_day(date).div_ceil(7)
        } else {
            calendar::week_of_month(date)
        };
        week == self.week_of_month.unsigned_abs()
    }
}

impl Rule for DayOfWeekOfMonth {
    fn matches(&self, date: NaiveDate, bounds: &Bounds) -> bool {
        calendar::day_of_week(date) == self.day_of_week
            && self.week_matches(date)
            && calendar::months_between(bounds.start, date).rem_euclid(bounds.frequency()) == 0
    }

    fn next_after(&self, after: NaiveDate, bounds: &Bounds) -> Option<NaiveDate> {
        next_in_aligned_months(
            after,
            bounds,
            |year, month| {
                calendar::nth_weekday_of_month(year, month, self.day_of_week, self.week_of_month)
            },
            |candidate| self.includes(candidate, bounds),
        )
    }
}
