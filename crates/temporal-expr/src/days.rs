//! "Every N days", counted from the start date.

use chrono::{Days as DayCount, NaiveDate};

use crate::calendar;
use crate::pattern::{Bounds, Rule};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Days;

impl Rule for Days {
    fn matches(&self, date: NaiveDate, bounds: &Bounds) -> bool {
        calendar::days_between(bounds.start, date).rem_euclid(bounds.frequency()) == 0
    }

    fn next_after(&self, after: NaiveDate, bounds: &Bounds) -> Option<NaiveDate> {
        let frequency = bounds.frequency();
        let mut candidate = after.succ_opt()?.max(bounds.start);

        // Jump straight to the next aligned day.
        let misalignment = calendar::days_between(bounds.start, candidate).rem_euclid(frequency);
        if misalignment != 0 {
            candidate = candidate.checked_add_days(DayCount::new((frequency - misalignment) as u64))?;
        }

        // Only ignored dates can fail from here; the ignore list is finite.
        loop {
            if bounds.past_end(candidate) {
                return None;
            }
            if self.includes(candidate, bounds) {
                return Some(candidate);
            }
            candidate = candidate.checked_add_days(DayCount::new(frequency as u64))?;
        }
    }
}
