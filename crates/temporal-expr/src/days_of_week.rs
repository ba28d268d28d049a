//! "Every N weeks on these weekdays": every Wednesday, every other Monday and Friday.
//!
//! Weeks are 7-day periods counted from the start date, not calendar weeks.
//! A pattern on Monday and Saturday that starts on a Friday therefore visits
//! Saturday (day 1 of the period) before Monday (day 3), and the frequency
//! skips whole periods after the last weekday of an aligned period.

use std::collections::BTreeSet;

use chrono::{Days as DayCount, NaiveDate};

use crate::calendar;
use crate::error::{Result, TemporalError};
use crate::pattern::{Bounds, Rule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaysOfWeek {
    /// ISO weekdays, 1 = Monday .. 7 = Sunday.
    days: BTreeSet<u32>,
}

impl DaysOfWeek {
    /// Build from one or more ISO weekday numbers. Duplicates collapse;
    /// an empty set or a value outside 1..=7 is rejected.
    pub fn new(days: impl IntoIterator<Item = u32>) -> Result<Self> {
        let mut set = BTreeSet::new();
        for day in days {
            if !(1..=7).contains(&day) {
                return Err(TemporalError::InvalidWeekdays(format!(
                    "expected weekdays within 1..=7, got {}",
                    day
                )));
            }
            set.insert(day);
        }
        if set.is_empty() {
            return Err(TemporalError::InvalidWeekdays(
                "at least one weekday is required".to_string(),
            ));
        }
        Ok(Self { days: set })
    }

    pub fn days(&self) -> &BTreeSet<u32> {
        &self.days
    }

    /// The configured weekdays in the order they occur after `start`,
    /// beginning with `start`'s own weekday.
    pub fn occurrence_order(&self, start: NaiveDate) -> Vec<u32> {
        let anchor = calendar::day_of_week(start);
        let mut order: Vec<u32> = self.days.iter().copied().collect();
        order.sort_by_key(|&day| rotation(day, anchor));
        order
    }
}

/// Days from weekday `anchor` forward to weekday `day` (0..7).
fn rotation(day: u32, anchor: u32) -> u32 {
    (day + 7 - anchor) % 7
}

impl Rule for DaysOfWeek {
    fn matches(&self, date: NaiveDate, bounds: &Bounds) -> bool {
        let week = calendar::days_between(bounds.start, date).div_euclid(7);
        self.days.contains(&calendar::day_of_week(date))
            && week.rem_euclid(bounds.frequency()) == 0
    }

    fn next_after(&self, after: NaiveDate, bounds: &Bounds) -> Option<NaiveDate> {
        let frequency = bounds.frequency();
        let anchor = calendar::day_of_week(bounds.start);
        let offsets: Vec<i64> = self
            .occurrence_order(bounds.start)
            .into_iter()
            .map(|day| i64::from(rotation(day, anchor)))
            .collect();
        let first = *offsets.first()?;

        let mut candidate = after.succ_opt()?.max(bounds.start);
        loop {
            let elapsed = calendar::days_between(bounds.start, candidate);
            let mut week = elapsed.div_euclid(7);
            let mut position = elapsed.rem_euclid(7);

            let misalignment = week.rem_euclid(frequency);
            if misalignment != 0 {
                week += frequency - misalignment;
                position = 0;
            }

            let day = match offsets.iter().find(|&&offset| offset >= position) {
                Some(offset) => week * 7 + offset,
                // Past the last weekday of this period: skip to the next aligned one.
                None => (week + frequency) * 7 + first,
            };

            let date = bounds
                .start
                .checked_add_days(DayCount::new(u64::try_from(day).ok()?))?;
            if bounds.past_end(date) {
                return None;
            }
            if self.includes(date, bounds) {
                return Some(date);
            }
            candidate = date.succ_opt()?;
        }
    }
}
