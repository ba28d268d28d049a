//! Tests for the "every N days" pattern.

use chrono::NaiveDate;
use temporal_expr::TemporalExpression;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn every_day_from_start() {
    let daily = TemporalExpression::days(date(2021, 1, 1));
    assert!(!daily.includes(date(2020, 12, 31)));
    assert!(daily.includes(date(2021, 1, 1)));
    assert!(daily.includes(date(2021, 7, 19)));
}

#[test]
fn end_date_is_inclusive() {
    let daily = TemporalExpression::days(date(2021, 1, 1))
        .with_end_date(date(2021, 1, 10))
        .unwrap();
    assert!(daily.includes(date(2021, 1, 10)));
    assert!(!daily.includes(date(2021, 1, 11)));
}

#[test]
fn frequency_is_counted_in_days_from_start() {
    let every_fifth = TemporalExpression::days(date(2021, 1, 1)).with_frequency(5).unwrap();
    assert!(!every_fifth.includes(date(2021, 1, 2)));
    assert!(every_fifth.includes(date(2021, 1, 6)));
    assert!(every_fifth.includes(date(2021, 1, 31)));
    assert!(!every_fifth.includes(date(2021, 2, 1)));
}

#[test]
fn ignored_date_is_excluded() {
    let daily = TemporalExpression::days(date(2021, 1, 1)).with_ignore_dates([date(2021, 1, 2)]);
    assert!(!daily.includes(date(2021, 1, 2)));
    assert!(daily.is_ignored(date(2021, 1, 2)));
}

#[test]
fn first_next_is_start() {
    let mut daily = TemporalExpression::days(date(2021, 1, 1));
    assert_eq!(daily.next(), Some(date(2021, 1, 1)));
    assert_eq!(daily.next(), Some(date(2021, 1, 2)));
}

#[test]
fn next_with_frequency() {
    let mut every_fifth = TemporalExpression::days(date(2021, 1, 1)).with_frequency(5).unwrap();
    let dates: Vec<_> = every_fifth.occurrences().take(3).collect();
    assert_eq!(dates, vec![date(2021, 1, 1), date(2021, 1, 6), date(2021, 1, 11)]);
}

#[test]
fn next_after_seek_to_misaligned_day() {
    let mut every_fifth = TemporalExpression::days(date(2021, 1, 1)).with_frequency(5).unwrap();
    every_fifth.seek(date(2021, 1, 3));
    assert_eq!(every_fifth.next(), Some(date(2021, 1, 6)));
}

#[test]
fn next_skips_ignored_dates() {
    let mut every_other = TemporalExpression::days(date(2021, 1, 1))
        .with_frequency(2)
        .unwrap()
        .with_ignore_dates([date(2021, 1, 3), date(2021, 1, 5)]);
    let dates: Vec<_> = every_other.occurrences().take(2).collect();
    assert_eq!(dates, vec![date(2021, 1, 1), date(2021, 1, 7)]);
}

#[test]
fn next_stops_at_end() {
    let mut every_fifth = TemporalExpression::days(date(2021, 1, 1))
        .with_frequency(5)
        .unwrap()
        .with_end_date(date(2021, 1, 14))
        .unwrap();
    let dates: Vec<_> = every_fifth.occurrences().collect();
    assert_eq!(dates, vec![date(2021, 1, 1), date(2021, 1, 6), date(2021, 1, 11)]);
}

#[test]
fn only_date_ignored_until_end_is_exhausted() {
    let mut single = TemporalExpression::days(date(2021, 1, 1))
        .with_end_date(date(2021, 1, 1))
        .unwrap()
        .with_ignore_dates([date(2021, 1, 1)]);
    assert_eq!(single.next(), None);
}
