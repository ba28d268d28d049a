//! Error types for temporal expression construction and (de)serialization.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemporalError {
    /// A weekday set that is not an integer or an array of integers in 1..=7.
    #[error("Invalid days of week: {0}")]
    InvalidWeekdays(String),

    /// A pattern field outside of its domain (e.g. a zero day of month).
    #[error("Invalid value for `{field}`: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("Missing required field: `{0}`")]
    MissingField(&'static str),

    #[error("Frequency must be at least 1, got {0}")]
    InvalidFrequency(i64),

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A value that cannot be cast into a pattern at all.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TemporalError {
    pub(crate) fn field(field: &'static str, message: impl Into<String>) -> Self {
        TemporalError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TemporalError>;
