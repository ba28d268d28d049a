//! The temporal expression: a pattern, its bounds, and an iteration cursor.
//!
//! `includes` is a pure function of the configuration. Only `seek`, `rewind`
//! and `next` touch the cursor, and `next` only ever leaves it on a date that
//! `includes` accepts.

use std::collections::BTreeSet;

use chrono::{DateTime, Days as DayCount, NaiveDate, TimeZone};
use chrono_tz::Tz;

use crate::calendar::CalendarDate;
use crate::day_of_month::DayOfMonth;
use crate::day_of_week_of_month::DayOfWeekOfMonth;
use crate::day_of_year::DayOfYear;
use crate::days::Days;
use crate::days_of_week::DaysOfWeek;
use crate::error::{Result, TemporalError};
use crate::pattern::{Bounds, Pattern, PatternType};

/// Iteration position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Cursor {
    /// Not started: the next `next()` yields the first occurrence.
    #[default]
    Unset,
    At(NaiveDate),
    /// A bounded pattern ran out; stays here until `rewind` or `seek`.
    Exhausted,
}

/// A recurring date pattern with optional end, frequency and exclusions.
///
/// ```rust
/// use chrono::NaiveDate;
/// use temporal_expr::TemporalExpression;
///
/// let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
///
/// // Last day of every other month.
/// let mut pattern = TemporalExpression::day_of_month(date(2021, 1, 1), -1)
///     .unwrap()
///     .with_frequency(2)
///     .unwrap();
///
/// assert!(pattern.includes(date(2021, 3, 31)));
/// assert!(!pattern.includes(date(2021, 2, 28)));
/// assert_eq!(pattern.next(), Some(date(2021, 1, 31)));
/// assert_eq!(pattern.next(), Some(date(2021, 3, 31)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalExpression {
    bounds: Bounds,
    pattern: Pattern,
    cursor: Cursor,
}

impl TemporalExpression {
    pub fn new(start: impl CalendarDate, pattern: Pattern) -> Self {
        Self {
            bounds: Bounds::new(start.date_only()),
            pattern,
            cursor: Cursor::Unset,
        }
    }

    /// Nth day of every month; negative counts from the end (`-1` = last day).
    pub fn day_of_month(start: impl CalendarDate, day_of_month: i32) -> Result<Self> {
        Ok(Self::new(
            start,
            Pattern::DayOfMonth(DayOfMonth::new(day_of_month)?),
        ))
    }

    /// Nth ISO weekday (1 = Monday) of every month; negative weeks count from the end.
    pub fn day_of_week_of_month(
        start: impl CalendarDate,
        day_of_week: u32,
        week_of_month: i32,
    ) -> Result<Self> {
        Ok(Self::new(
            start,
            Pattern::DayOfWeekOfMonth(DayOfWeekOfMonth::new(day_of_week, week_of_month)?),
        ))
    }

    /// A fixed day and month every year.
    pub fn day_of_year(start: impl CalendarDate, day: u32, month: u32) -> Result<Self> {
        Ok(Self::new(
            start,
            Pattern::DayOfYear(DayOfYear::new(day, month)?),
        ))
    }

    /// Every day; with a frequency, every N days.
    pub fn days(start: impl CalendarDate) -> Self {
        Self::new(start, Pattern::Days(Days))
    }

    /// One or more ISO weekdays (1 = Monday .. 7 = Sunday) every week.
    pub fn days_of_week(start: impl CalendarDate, days: impl IntoIterator<Item = u32>) -> Result<Self> {
        Ok(Self::new(
            start,
            Pattern::DaysOfWeek(DaysOfWeek::new(days)?),
        ))
    }

    // -----------------------------------------------------------------------
    // Builders and setters
    // -----------------------------------------------------------------------

    pub fn with_end_date(mut self, end: impl CalendarDate) -> Result<Self> {
        self.set_end_date(end)?;
        Ok(self)
    }

    pub fn with_frequency(mut self, frequency: u32) -> Result<Self> {
        self.set_frequency(frequency)?;
        Ok(self)
    }

    pub fn with_ignore_dates<D: CalendarDate>(mut self, dates: impl IntoIterator<Item = D>) -> Self {
        self.set_ignore_dates(dates);
        self
    }

    /// Set the zone used to read absolute instants. Only Day of Year
    /// patterns carry a zone; every other kind accepts UTC only.
    pub fn with_timezone(mut self, timezone: Tz) -> Result<Self> {
        match &mut self.pattern {
            Pattern::DayOfYear(pattern) => *pattern = pattern.with_timezone(timezone),
            _ if timezone == Tz::UTC => {}
            other => {
                return Err(TemporalError::InvalidTimezone(format!(
                    "{} patterns do not carry a timezone (got {})",
                    other.pattern_type(),
                    timezone
                )))
            }
        }
        Ok(self)
    }

    /// Set the inclusive end date. Rejects an end before `start`.
    ///
    /// The cursor stays where it is, so [`current`](Self::current) may hold a
    /// date `includes` now rejects. The next [`next`](Self::next) resumes after it.
    pub fn set_end_date(&mut self, end: impl CalendarDate) -> Result<&mut Self> {
        let end = end.date_only();
        if end < self.bounds.start {
            return Err(TemporalError::EndBeforeStart {
                start: self.bounds.start,
                end,
            });
        }
        self.bounds.end = Some(end);
        Ok(self)
    }

    /// Remove the end date. The cursor is left as-is.
    pub fn clear_end_date(&mut self) -> &mut Self {
        self.bounds.end = None;
        self
    }

    /// Set the stride in the pattern's own unit. Must be at least 1.
    ///
    /// The cursor stays where it is, so [`current`](Self::current) may hold a
    /// date `includes` now rejects. The next [`next`](Self::next) resumes after it.
    pub fn set_frequency(&mut self, frequency: u32) -> Result<&mut Self> {
        if frequency == 0 {
            return Err(TemporalError::InvalidFrequency(0));
        }
        self.bounds.frequency = frequency;
        Ok(self)
    }

    /// Replace the ignore list. Only the calendar date of each value is kept.
    ///
    /// The cursor stays where it is, so [`current`](Self::current) may hold a
    /// date `includes` now rejects. The next [`next`](Self::next) resumes after it.
    pub fn set_ignore_dates<D: CalendarDate>(&mut self, dates: impl IntoIterator<Item = D>) -> &mut Self {
        self.bounds.ignore_dates = dates.into_iter().map(|d| d.date_only()).collect();
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn start(&self) -> NaiveDate {
        self.bounds.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.bounds.end
    }

    pub fn frequency(&self) -> u32 {
        self.bounds.frequency
    }

    pub fn ignore_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.bounds.ignore_dates
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern.pattern_type()
    }

    /// Zone for reading absolute instants: the configured one for Day of
    /// Year patterns, UTC otherwise.
    pub fn timezone(&self) -> Tz {
        match &self.pattern {
            Pattern::DayOfYear(pattern) => pattern.timezone(),
            _ => Tz::UTC,
        }
    }

    // -----------------------------------------------------------------------
    // Matching
    // -----------------------------------------------------------------------

    /// Whether `date` is an occurrence of this pattern. Time-of-day is ignored.
    pub fn includes(&self, date: impl CalendarDate) -> bool {
        self.pattern.includes(date.date_only(), &self.bounds)
    }

    /// Like [`includes`](Self::includes) for an absolute instant, read in
    /// the pattern's zone first.
    pub fn includes_instant<Z: TimeZone>(&self, instant: &DateTime<Z>) -> bool {
        self.includes(instant.with_timezone(&self.timezone()))
    }

    /// Whether the ignore list holds the calendar date of `date`.
    pub fn is_ignored(&self, date: impl CalendarDate) -> bool {
        self.bounds.is_ignored(date.date_only())
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    /// The cursor, if iteration has started and is not exhausted.
    pub fn current(&self) -> Option<NaiveDate> {
        match self.cursor {
            Cursor::At(date) => Some(date),
            Cursor::Unset | Cursor::Exhausted => None,
        }
    }

    /// Whether the cursor is set and within `start..=end`.
    pub fn valid(&self) -> bool {
        self.current().is_some_and(|date| self.bounds.contains(date))
    }

    pub fn includes_current(&self) -> bool {
        self.current().is_some_and(|date| self.includes(date))
    }

    /// Move the cursor to `date` (time-of-day stripped). Any date is allowed;
    /// the following `next()` yields the first occurrence after it.
    pub fn seek(&mut self, date: impl CalendarDate) -> NaiveDate {
        let date = date.date_only();
        tracing::trace!(%date, "seek");
        self.cursor = Cursor::At(date);
        date
    }

    /// Reset iteration so the next `next()` yields the first occurrence.
    pub fn rewind(&mut self) -> Option<NaiveDate> {
        self.cursor = Cursor::Unset;
        self.current()
    }

    /// Advance to the next occurrence after the cursor.
    ///
    /// Returns `None` once a bounded pattern is exhausted; the cursor is then
    /// cleared and further calls keep returning `None` until `rewind`/`seek`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<NaiveDate> {
        let after = match self.cursor {
            Cursor::Exhausted => return None,
            Cursor::At(date) if date >= self.bounds.start => Some(date),
            Cursor::At(_) | Cursor::Unset => self.bounds.start.pred_opt(),
        };

        let found = after.and_then(|after| self.pattern.next_after(after, &self.bounds));
        match found {
            Some(date) => {
                tracing::trace!(%date, pattern = %self.pattern_type(), "next occurrence");
                self.cursor = Cursor::At(date);
            }
            None => {
                tracing::debug!(pattern = %self.pattern_type(), "pattern exhausted");
                self.cursor = Cursor::Exhausted;
            }
        }
        found
    }

    /// Iterate occurrences from the current cursor by repeatedly calling `next()`.
    pub fn occurrences(&mut self) -> Occurrences<'_> {
        Occurrences { expression: self }
    }

    /// All occurrences within `from..=to`, without disturbing this cursor.
    pub fn occurrences_between(&self, from: impl CalendarDate, to: impl CalendarDate) -> Vec<NaiveDate> {
        let (from, to) = (from.date_only(), to.date_only());
        let mut walker = self.clone();
        match from.checked_sub_days(DayCount::new(1)) {
            Some(before) => {
                walker.seek(before);
            }
            None => {
                walker.rewind();
            }
        }
        walker.occurrences().take_while(|date| *date <= to).collect()
    }
}

/// Iterator returned by [`TemporalExpression::occurrences`].
#[derive(Debug)]
pub struct Occurrences<'a> {
    expression: &'a mut TemporalExpression,
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        self.expression.next()
    }
}
