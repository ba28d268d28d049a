//! # temporal-expr
//!
//! Recurring date patterns ("temporal expressions") at day granularity.
//!
//! A pattern answers whether a calendar date belongs to it (`includes`) and
//! walks its occurrences forward from a cursor (`next`). Month and year
//! strides are measured in calendar units, so "the last day of every other
//! month" and "February 29 every year" behave across short months and
//! non-leap years.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use temporal_expr::TemporalExpression;
//!
//! let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
//!
//! // Every other week on Monday and Friday, starting on a Friday.
//! let mut pattern = TemporalExpression::days_of_week(date(2021, 1, 1), [1, 5])
//!     .unwrap()
//!     .with_frequency(2)
//!     .unwrap();
//!
//! let first: Vec<_> = pattern.occurrences().take(4).collect();
//! assert_eq!(
//!     first,
//!     vec![date(2021, 1, 1), date(2021, 1, 4), date(2021, 1, 15), date(2021, 1, 18)]
//! );
//! ```
//!
//! ## Modules
//!
//! - [`calendar`] -- day/month/year arithmetic and weekday numbering
//! - [`expression`] -- `TemporalExpression`: bounds, ignore list, cursor
//! - [`pattern`] -- the `Pattern` sum type and `PatternType` wire tags
//! - [`day_of_month`], [`day_of_week_of_month`], [`day_of_year`], [`days`],
//!   [`days_of_week`] -- the five pattern kinds
//! - [`options`] -- option-map factory, serialized form, value cast
//! - [`validation`] -- field rules for raw option maps
//! - [`error`] -- Error types

pub mod calendar;
pub mod day_of_month;
pub mod day_of_week_of_month;
pub mod day_of_year;
pub mod days;
pub mod days_of_week;
pub mod error;
pub mod expression;
pub mod options;
pub mod pattern;
pub mod validation;

pub use calendar::CalendarDate;
pub use error::TemporalError;
pub use expression::{Occurrences, TemporalExpression};
pub use options::{cast, OptionMap};
pub use pattern::{Bounds, Pattern, PatternType};
pub use validation::{validate, validation_rules, Constraint, FieldRule, Violation};
