//! Calendar arithmetic on day-granular dates.
//!
//! Pure helpers shared by every pattern: field extraction, month lengths,
//! ISO weekday numbering (1 = Monday .. 7 = Sunday), week-of-month, and the
//! "elapsed whole calendar units" counts that frequency alignment is built on.
//!
//! Month and year strides are always measured by counting calendar fields,
//! never by dividing a day delta: 2021-01-31 to 2021-03-01 is two months.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeZone, Weekday};

/// Years after which the Gregorian calendar repeats weekday/leap alignment.
pub const GREGORIAN_CYCLE_YEARS: u32 = 400;

/// [`GREGORIAN_CYCLE_YEARS`] in months.
pub const GREGORIAN_CYCLE_MONTHS: u32 = GREGORIAN_CYCLE_YEARS * 12;

/// A value that can be reduced to a calendar date, discarding time-of-day.
///
/// Zoned datetimes are reduced to their local date in their own zone.
pub trait CalendarDate {
    fn date_only(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn date_only(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn date_only(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn date_only(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl<T: CalendarDate + ?Sized> CalendarDate for &T {
    fn date_only(&self) -> NaiveDate {
        (**self).date_only()
    }
}

/// Strip time-of-day from any [`CalendarDate`].
pub fn date_only(date: impl CalendarDate) -> NaiveDate {
    date.date_only()
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1..=12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// ISO weekday number: 1 = Monday .. 7 = Sunday.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// 1-based week of the month, counting 7-day blocks from the 1st.
///
/// Days 1-7 are week 1, days 8-14 week 2, and so on, so the week number of a
/// date is also the ordinal of its weekday within the month.
pub fn week_of_month(date: NaiveDate) -> u32 {
    date.day().div_ceil(7)
}

/// The day index of `date` counted backwards from the end of its month.
///
/// The last day of the month maps to 1, the day before it to 2. Matching and
/// stepping both use this so "from the end" is the from-start rule mirrored.
pub fn mirrored_day(date: NaiveDate) -> u32 {
    days_in_month(date.year(), date.month()) - date.day() + 1
}

/// Whole calendar months from `from` to `to`, by year/month fields only.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// Whole calendar years from `from` to `to`, by the year field only.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year())
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Advance a first-of-month date by whole months. `None` past chrono's range.
pub fn add_months(first: NaiveDate, months: u32) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(months))
}

/// Resolve a signed day index within a month.
///
/// Positive indices count from the 1st, negative ones from the last day
/// (`-1` is the last day). Returns `None` when the month is too short.
pub fn nth_day_of_month(year: i32, month: u32, index: i32) -> Option<NaiveDate> {
    let length = days_in_month(year, month) as i32;
    let day = if index > 0 { index } else { length + 1 + index };
    if day < 1 || day > length {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day as u32)
}

/// Resolve the `nth` occurrence of ISO `weekday` within a month.
///
/// Positive `nth` counts from the start of the month, negative from the end
/// (`-1` is the last such weekday). Returns `None` when the month has fewer
/// occurrences.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: u32, nth: i32) -> Option<NaiveDate> {
    let weekday = weekday_from_number(weekday)?;
    if nth > 0 {
        let nth = u8::try_from(nth).ok()?;
        return NaiveDate::from_weekday_of_month_opt(year, month, weekday, nth);
    }

    let length = days_in_month(year, month);
    let last = NaiveDate::from_ymd_opt(year, month, length)?;
    let back = (7 + day_of_week(last) - weekday.number_from_monday()) % 7;
    let weeks_back = nth.unsigned_abs().checked_sub(1)?;
    let day = i64::from(length) - i64::from(back) - 7 * i64::from(weeks_back);
    if day < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day as u32)
}

/// Map an ISO weekday number (1..=7) onto [`Weekday`].
pub fn weekday_from_number(number: u32) -> Option<Weekday> {
    match number {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}
