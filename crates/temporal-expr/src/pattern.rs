//! The closed set of pattern kinds and the bounds they are evaluated against.
//!
//! Every variant answers two questions against a shared [`Bounds`]:
//! does a date match (`matches`, frequency alignment included), and what is
//! the first included date strictly after a given one (`next_after`).
//! [`TemporalExpression`](crate::TemporalExpression) layers the cursor on top.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{self, GREGORIAN_CYCLE_MONTHS};
use crate::day_of_month::DayOfMonth;
use crate::day_of_week_of_month::DayOfWeekOfMonth;
use crate::day_of_year::DayOfYear;
use crate::days::Days;
use crate::days_of_week::DaysOfWeek;

/// Configuration shared by every pattern: inclusive range, stride and exclusions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    pub(crate) start: NaiveDate,
    pub(crate) end: Option<NaiveDate>,
    pub(crate) frequency: u32,
    pub(crate) ignore_dates: BTreeSet<NaiveDate>,
}

impl Bounds {
    pub(crate) fn new(start: NaiveDate) -> Self {
        Self {
            start,
            end: None,
            frequency: 1,
            ignore_dates: BTreeSet::new(),
        }
    }

    /// `start <= date <= end` (end unbounded when absent).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && !self.past_end(date)
    }

    pub fn past_end(&self, date: NaiveDate) -> bool {
        self.end.is_some_and(|end| date > end)
    }

    pub fn is_ignored(&self, date: NaiveDate) -> bool {
        self.ignore_dates.contains(&date)
    }

    /// In range and not explicitly excluded.
    pub fn admits(&self, date: NaiveDate) -> bool {
        self.contains(date) && !self.is_ignored(date)
    }

    pub(crate) fn frequency(&self) -> i64 {
        i64::from(self.frequency)
    }
}

/// Behaviour every pattern variant provides.
pub(crate) trait Rule {
    /// Pattern-specific match, including frequency alignment from `start`.
    /// Range and ignore-list checks are done by the caller.
    fn matches(&self, date: NaiveDate, bounds: &Bounds) -> bool;

    /// First date strictly after `after` that the full pattern includes.
    ///
    /// `after` is never earlier than the day before `start`.
    fn next_after(&self, after: NaiveDate, bounds: &Bounds) -> Option<NaiveDate>;

    fn includes(&self, date: NaiveDate, bounds: &Bounds) -> bool {
        bounds.admits(date) && self.matches(date, bounds)
    }
}

/// Wire tag selecting a pattern variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    #[serde(rename = "Day of Month")]
    DayOfMonth,
    #[serde(rename = "Day of Week of Month")]
    DayOfWeekOfMonth,
    #[serde(rename = "Day of Year")]
    DayOfYear,
    #[serde(rename = "Days")]
    Days,
    #[serde(rename = "Days of Week")]
    DaysOfWeek,
}

impl PatternType {
    pub const ALL: [PatternType; 5] = [
        PatternType::DayOfMonth,
        PatternType::DayOfWeekOfMonth,
        PatternType::DayOfYear,
        PatternType::Days,
        PatternType::DaysOfWeek,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            PatternType::DayOfMonth => "Day of Month",
            PatternType::DayOfWeekOfMonth => "Day of Week of Month",
            PatternType::DayOfYear => "Day of Year",
            PatternType::Days => "Days",
            PatternType::DaysOfWeek => "Days of Week",
        }
    }

    /// Look up a tag; unknown tags are `None`, not an error.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unknown pattern type '{}'", s))
    }
}

/// One of the five pattern kinds with its own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    DayOfMonth(DayOfMonth),
    DayOfWeekOfMonth(DayOfWeekOfMonth),
    DayOfYear(DayOfYear),
    Days(Days),
    DaysOfWeek(DaysOfWeek),
}

impl Pattern {
    pub fn pattern_type(&self) -> PatternType {
        match self {
            Pattern::DayOfMonth(_) => PatternType::DayOfMonth,
            Pattern::DayOfWeekOfMonth(_) => PatternType::DayOfWeekOfMonth,
            Pattern::DayOfYear(_) => PatternType::DayOfYear,
            Pattern::Days(_) => PatternType::Days,
            Pattern::DaysOfWeek(_) => PatternType::DaysOfWeek,
        }
    }

    fn rule(&self) -> &dyn Rule {
        match self {
            Pattern::DayOfMonth(p) => p,
            Pattern::DayOfWeekOfMonth(p) => p,
            Pattern::DayOfYear(p) => p,
            Pattern::Days(p) => p,
            Pattern::DaysOfWeek(p) => p,
        }
    }

    pub(crate) fn includes(&self, date: NaiveDate, bounds: &Bounds) -> bool {
        self.rule().includes(date, bounds)
    }

    pub(crate) fn next_after(&self, after: NaiveDate, bounds: &Bounds) -> Option<NaiveDate> {
        self.rule().next_after(after, bounds)
    }
}

/// Shared stepper for the month-based variants.
///
/// Starting at the month containing `after`, visit only months whose distance
/// from `start` is a multiple of the frequency, resolve the target day in each
/// with `resolve(year, month)`, and return the first one after `after` that
/// `includes` accepts. Gives up past `end` or after a full Gregorian cycle.
pub(crate) fn next_in_aligned_months(
    after: NaiveDate,
    bounds: &Bounds,
    resolve: impl Fn(i32, u32) -> Option<NaiveDate>,
    includes: impl Fn(NaiveDate) -> bool,
) -> Option<NaiveDate> {
    let frequency = bounds.frequency();
    let mut month = calendar::first_of_month(after);

    for _ in 0..GREGORIAN_CYCLE_MONTHS {
        let misalignment = calendar::months_between(bounds.start, month).rem_euclid(frequency);
        if misalignment != 0 {
            month = calendar::add_months(month, u32::try_from(frequency - misalignment).ok()?)?;
        }
        if bounds.past_end(month) {
            return None;
        }

        if let Some(candidate) = resolve(month.year(), month.month()) {
            if bounds.past_end(candidate) {
                return None;
            }
            if candidate > after && includes(candidate) {
                return Some(candidate);
            }
        }

        month = calendar::add_months(month, 1)?;
    }

    tracing::debug!(%after, "no occurrence within a Gregorian cycle of aligned months");
    None
}
