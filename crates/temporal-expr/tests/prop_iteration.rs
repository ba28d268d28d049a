//! Property-based tests for pattern iteration using proptest.
//!
//! `next()` must enumerate exactly the dates `includes()` accepts, in order,
//! for any pattern configuration. The brute-force side of each comparison
//! walks every day of a window and filters it through `includes`.

use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use proptest::prelude::*;
use temporal_expr::calendar::days_in_month;
use temporal_expr::TemporalExpression;

const WINDOW_DAYS: u64 = 1000;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Kind {
    DayOfMonth(i32),
    DayOfWeekOfMonth(u32, i32),
    DayOfYear(u32, u32),
    Days,
    DaysOfWeek(Vec<u32>),
}

fn arb_kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        (-31i32..=31)
            .prop_filter("day of month is nonzero", |d| *d != 0)
            .prop_map(Kind::DayOfMonth),
        (1u32..=7, (-5i32..=5).prop_filter("week is nonzero", |w| *w != 0))
            .prop_map(|(day, week)| Kind::DayOfWeekOfMonth(day, week)),
        (1u32..=12, 1u32..=31)
            .prop_map(|(month, day)| Kind::DayOfYear(day.min(days_in_month(2024, month)), month)),
        Just(Kind::Days),
        prop::collection::btree_set(1u32..=7, 1..=7)
            .prop_map(|days| Kind::DaysOfWeek(days.into_iter().collect())),
    ]
}

/// Zones for Day of Year patterns, including ones whose clocks skipped
/// midnight (Sao Paulo until 2018) or a whole day (Apia, 2011-12-30).
fn arb_timezone() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(Tz::UTC),
        Just(Tz::America__Sao_Paulo),
        Just(Tz::Pacific__Apia),
        Just(Tz::America__New_York),
        Just(Tz::Asia__Tokyo),
        Just(Tz::Australia__Lord_Howe),
    ]
}

/// Start dates across leap and common years, back far enough to reach the
/// Sao Paulo and Apia transitions.
fn arb_start() -> impl Strategy<Value = NaiveDate> {
    (2010i32..=2025, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d.min(days_in_month(y, m))).unwrap()
    })
}

#[derive(Debug, Clone)]
struct Config {
    kind: Kind,
    start: NaiveDate,
    /// Applied to Day of Year patterns only.
    timezone: Tz,
    frequency: u32,
    /// Days after start.
    end: Option<u64>,
    /// Days after start.
    ignore: Vec<u64>,
}

fn arb_config() -> impl Strategy<Value = Config> {
    (
        arb_kind(),
        arb_start(),
        arb_timezone(),
        1u32..=4,
        prop::option::of(0u64..=WINDOW_DAYS),
        prop::collection::vec(0u64..WINDOW_DAYS, 0..4),
    )
        .prop_map(|(kind, start, timezone, frequency, end, ignore)| Config {
            kind,
            start,
            timezone,
            frequency,
            end,
            ignore,
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn plus(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap()
}

fn build(config: &Config) -> TemporalExpression {
    let start = config.start;
    let pattern = match &config.kind {
        Kind::DayOfMonth(day) => TemporalExpression::day_of_month(start, *day),
        Kind::DayOfWeekOfMonth(day, week) => {
            TemporalExpression::day_of_week_of_month(start, *day, *week)
        }
        Kind::DayOfYear(day, month) => TemporalExpression::day_of_year(start, *day, *month)
            .and_then(|pattern| pattern.with_timezone(config.timezone)),
        Kind::Days => Ok(TemporalExpression::days(start)),
        Kind::DaysOfWeek(days) => TemporalExpression::days_of_week(start, days.iter().copied()),
    }
    .unwrap()
    .with_frequency(config.frequency)
    .unwrap()
    .with_ignore_dates(config.ignore.iter().map(|offset| plus(start, *offset)));

    match config.end {
        Some(offset) => pattern.with_end_date(plus(start, offset)).unwrap(),
        None => pattern,
    }
}

/// Every included date in `start..=start + WINDOW_DAYS`, by brute force.
fn included_in_window(pattern: &TemporalExpression) -> Vec<NaiveDate> {
    (0..=WINDOW_DAYS)
        .map(|offset| plus(pattern.start(), offset))
        .filter(|date| pattern.includes(*date))
        .collect()
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: next() enumerates exactly the included dates
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn next_matches_brute_force(config in arb_config()) {
        let pattern = build(&config);
        let window_end = plus(pattern.start(), WINDOW_DAYS);

        let expected = included_in_window(&pattern);
        let actual = pattern.occurrences_between(pattern.start(), window_end);
        prop_assert_eq!(actual, expected);
    }
}

// ---------------------------------------------------------------------------
// Property 2: yielded dates are strictly increasing, included and in range
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn next_is_increasing_and_included(config in arb_config()) {
        let mut pattern = build(&config);
        let dates: Vec<_> = pattern.occurrences().take(30).collect();

        for window in dates.windows(2) {
            prop_assert!(window[0] < window[1], "not increasing: {} >= {}", window[0], window[1]);
        }
        for date in &dates {
            prop_assert!(pattern.includes(*date), "{} yielded but not included", date);
            prop_assert!(*date >= pattern.start());
            if let Some(end) = pattern.end() {
                prop_assert!(*date <= end, "{} is after end {}", date, end);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: after seek(d), next() is the first included date after d
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn seek_then_next_is_first_later_inclusion(
        config in arb_config(),
        seek_offset in 0u64..WINDOW_DAYS,
    ) {
        let mut pattern = build(&config);
        let target = plus(pattern.start(), seek_offset);
        let expected = included_in_window(&pattern)
            .into_iter()
            .find(|date| *date > target);

        pattern.seek(target);
        let actual = pattern.next();
        match expected {
            Some(expected) => prop_assert_eq!(actual, Some(expected)),
            // Nothing left in the window; a later date may still exist.
            None => prop_assert!(actual.map_or(true, |date| date > plus(pattern.start(), WINDOW_DAYS))),
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: rewind replays the same sequence
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn rewind_replays_sequence(config in arb_config()) {
        let mut pattern = build(&config);
        let first: Vec<_> = pattern.occurrences().take(10).collect();
        pattern.rewind();
        let second: Vec<_> = pattern.occurrences().take(10).collect();
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Property 5: decomposing and rebuilding preserves the pattern
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn json_rebuild_is_identical(config in arb_config()) {
        let pattern = build(&config);
        let json = pattern.to_json();
        let rebuilt = TemporalExpression::from_json(&json).unwrap().unwrap();
        prop_assert_eq!(&rebuilt, &pattern);
        prop_assert_eq!(rebuilt.to_json(), json);
    }
}

// ---------------------------------------------------------------------------
// Property 6: zoned dates next to clock transitions rebuild unchanged
// ---------------------------------------------------------------------------

/// Dates whose local midnight was skipped in Sao Paulo, and the day Apia skipped.
fn arb_transition_date() -> impl Strategy<Value = NaiveDate> {
    let transitions = [
        NaiveDate::from_ymd_opt(2011, 12, 30).unwrap(),
        NaiveDate::from_ymd_opt(2016, 10, 16).unwrap(),
        NaiveDate::from_ymd_opt(2017, 10, 15).unwrap(),
        NaiveDate::from_ymd_opt(2018, 11, 4).unwrap(),
    ];
    (prop::sample::select(transitions.to_vec()), 0u64..=4)
        .prop_map(|(transition, offset)| plus(transition.checked_sub_days(Days::new(2)).unwrap(), offset))
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn zoned_json_rebuild_near_transitions(
        start in arb_transition_date(),
        end in prop::option::of(arb_transition_date()),
        ignore in prop::collection::vec(arb_transition_date(), 0..4),
        timezone in arb_timezone(),
        (month, day) in (1u32..=12, 1u32..=28),
    ) {
        let mut pattern = TemporalExpression::day_of_year(start, day, month)
            .unwrap()
            .with_timezone(timezone)
            .unwrap()
            .with_ignore_dates(ignore);
        if let Some(end) = end.filter(|end| *end >= start) {
            pattern.set_end_date(end).unwrap();
        }

        let json = pattern.to_json();
        let rebuilt = TemporalExpression::from_json(&json).unwrap().unwrap();
        prop_assert_eq!(&rebuilt, &pattern, "rebuilt from {}", json);
        prop_assert_eq!(rebuilt.to_json(), json);
    }
}
