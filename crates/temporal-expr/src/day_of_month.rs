//! "The Nth day of every month": 1st, 15th, last day, second to last day.
//!
//! Positive indices count from the 1st, negative ones from the end of the
//! month. The frequency is a stride in calendar months from the start month.

use chrono::{Datelike, NaiveDate};

use crate::calendar;
use crate::error::{Result, TemporalError};
use crate::pattern::{next_in_aligned_months, Bounds, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOfMonth {
    day_of_month: i32,
}

impl DayOfMonth {
    /// `day_of_month` must be nonzero and within `-31..=31`.
    pub fn new(day_of_month: i32) -> Result<Self> {
        if day_of_month == 0 || day_of_month.unsigned_abs() > 31 {
            return Err(TemporalError::field(
                "day_of_month",
                format!("expected a nonzero day within -31..=31, got {}", day_of_month),
            ));
        }
        Ok(Self { day_of_month })
    }

    pub fn day_of_month(&self) -> i32 {
        self.day_of_month
    }

    pub fn from_end(&self) -> bool {
        self.day_of_month < 0
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        if self.from_end() {
            calendar::mirrored_day(date) == self.day_of_month.unsigned_abs()
        } else {
            date.day() == self.day_of_month.unsigned_abs()
        }
    }
}

impl Rule for DayOfMonth {
    fn matches(&self, date: NaiveDate, bounds: &Bounds) -> bool {
        self.day_matches(date)
            && calendar::months_between(bounds.start, date).rem_euclid(bounds.frequency()) == 0
    }

    fn next_after(&self, after: NaiveDate, bounds: &Bounds) -> Option<NaiveDate> {
        next_in_aligned_months(
            after,
            bounds,
            |year, month| calendar::nth_day_of_month(year, month, self.day_of_month),
            |candidate| self.includes(candidate, bounds),
        )
    }
}
