//! Construction from plain option maps and decomposition back into them.
//!
//! The serialized form is a flat JSON object:
//!
//! ```json
//! {"type":"Days of Week","start":"2021-01-01T00:00:00.000000Z","frequency":2,"days":[1,5]}
//! ```
//!
//! Absent, null and empty fields are dropped rather than written as null, so
//! decomposing a reconstructed pattern reproduces the original bytes. Dates
//! are written as the UTC instant of local midnight in the pattern's zone and
//! read back in that zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Result, TemporalError};
use crate::expression::TemporalExpression;
use crate::pattern::{Pattern, PatternType};

/// A plain option map, as produced by [`TemporalExpression::to_map`].
pub type OptionMap = Map<String, Value>;

/// Option keys recognised by the factory.
pub mod keys {
    pub const TYPE: &str = "type";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const FREQUENCY: &str = "frequency";
    pub const IGNORE_DATES: &str = "ignore_dates";
    pub const TIMEZONE: &str = "timezone";
    pub const DAY_OF_MONTH: &str = "day_of_month";
    pub const DAY_OF_WEEK: &str = "day_of_week";
    pub const WEEK_OF_MONTH: &str = "week_of_month";
    pub const DAY: &str = "day";
    pub const MONTH: &str = "month";
    pub const DAYS: &str = "days";
}

impl TemporalExpression {
    /// Build a pattern from an option map, dispatching on its `type` key.
    ///
    /// A missing or unrecognised `type` yields `Ok(None)`; callers must
    /// check for it. Malformed fields of a recognised type are errors.
    pub fn create(options: &OptionMap) -> Result<Option<Self>> {
        let Some(tag) = options.get(keys::TYPE).and_then(Value::as_str) else {
            tracing::debug!("option map has no pattern type");
            return Ok(None);
        };
        let Some(pattern_type) = PatternType::from_tag(tag) else {
            tracing::debug!(tag, "unknown pattern type");
            return Ok(None);
        };
        Self::create_as(pattern_type, options).map(Some)
    }

    /// Build a pattern of a known type from an option map; `type` is ignored.
    pub fn create_as(pattern_type: PatternType, options: &OptionMap) -> Result<Self> {
        let timezone = match pattern_type {
            PatternType::DayOfYear => optional_timezone(options)?.unwrap_or(Tz::UTC),
            _ => Tz::UTC,
        };
        let start = optional_date(options, keys::START, timezone)?
            .ok_or(TemporalError::MissingField(keys::START))?;

        let mut expression = match pattern_type {
            PatternType::DayOfMonth => {
                Self::day_of_month(start, required_int(options, keys::DAY_OF_MONTH)?)?
            }
            PatternType::DayOfWeekOfMonth => Self::day_of_week_of_month(
                start,
                required_int(options, keys::DAY_OF_WEEK)?,
                required_int(options, keys::WEEK_OF_MONTH)?,
            )?,
            PatternType::DayOfYear => Self::day_of_year(
                start,
                required_int(options, keys::DAY)?,
                required_int(options, keys::MONTH)?,
            )?
            .with_timezone(timezone)?,
            PatternType::Days => Self::days(start),
            PatternType::DaysOfWeek => Self::days_of_week(start, weekdays(options.get(keys::DAYS))?)?,
        };

        if let Some(end) = optional_date(options, keys::END, timezone)? {
            expression.set_end_date(end)?;
        }
        if let Some(frequency) = present(options, keys::FREQUENCY) {
            let frequency = frequency
                .as_i64()
                .ok_or_else(|| TemporalError::field(keys::FREQUENCY, "expected an integer"))?;
            let frequency =
                u32::try_from(frequency).map_err(|_| TemporalError::InvalidFrequency(frequency))?;
            expression.set_frequency(frequency)?;
        }
        if let Some(dates) = present(options, keys::IGNORE_DATES) {
            let dates = dates
                .as_array()
                .ok_or_else(|| TemporalError::field(keys::IGNORE_DATES, "expected an array of dates"))?
                .iter()
                .map(|value| date_value(value, keys::IGNORE_DATES, timezone))
                .collect::<Result<Vec<_>>>()?;
            expression.set_ignore_dates(dates);
        }

        Ok(expression)
    }

    /// Build from a JSON object value. Unknown types yield `Ok(None)`.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Object(options) => Self::create(options),
            other => Err(TemporalError::InvalidArgument(format!(
                "expected a JSON object, got {}",
                value_kind(other)
            ))),
        }
    }

    /// Parse a serialized pattern. Unknown types yield `Ok(None)`.
    pub fn from_json(json: &str) -> Result<Option<Self>> {
        Self::from_value(&serde_json::from_str::<Value>(json)?)
    }

    /// Decompose into the flat serialized form (cursor state is not kept).
    pub fn to_map(&self) -> OptionMap {
        let timezone = self.timezone();
        let mut map = Map::new();
        map.insert(keys::TYPE.into(), self.pattern_type().tag().into());
        map.insert(keys::START.into(), format_date(self.start(), timezone).into());
        if let Some(end) = self.end() {
            map.insert(keys::END.into(), format_date(end, timezone).into());
        }
        map.insert(keys::FREQUENCY.into(), self.frequency().into());
        if !self.ignore_dates().is_empty() {
            let dates = self
                .ignore_dates()
                .iter()
                .map(|date| Value::from(format_date(*date, timezone)))
                .collect();
            map.insert(keys::IGNORE_DATES.into(), Value::Array(dates));
        }

        match self.pattern() {
            Pattern::DayOfMonth(pattern) => {
                map.insert(keys::DAY_OF_MONTH.into(), pattern.day_of_month().into());
            }
            Pattern::DayOfWeekOfMonth(pattern) => {
                map.insert(keys::DAY_OF_WEEK.into(), pattern.day_of_week().into());
                map.insert(keys::WEEK_OF_MONTH.into(), pattern.week_of_month().into());
            }
            Pattern::DayOfYear(pattern) => {
                map.insert(keys::TIMEZONE.into(), pattern.timezone().name().into());
                map.insert(keys::DAY.into(), pattern.day().into());
                map.insert(keys::MONTH.into(), pattern.month().into());
            }
            Pattern::Days(_) => {}
            Pattern::DaysOfWeek(pattern) => {
                let days = pattern.days().iter().map(|day| Value::from(*day)).collect();
                map.insert(keys::DAYS.into(), Value::Array(days));
            }
        }
        map
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

/// Reconstruct a pattern from a loosely typed stored value.
///
/// Null is "no pattern", an object is an option map, a string is serialized
/// JSON. Any other value is an [`TemporalError::InvalidArgument`].
pub fn cast(value: &Value) -> Result<Option<TemporalExpression>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(options) => TemporalExpression::create(options),
        Value::String(json) => TemporalExpression::from_json(json),
        other => Err(TemporalError::InvalidArgument(format!(
            "cannot cast {} into a temporal expression",
            value_kind(other)
        ))),
    }
}

impl TryFrom<Value> for TemporalExpression {
    type Error = TemporalError;

    fn try_from(value: Value) -> Result<Self> {
        cast(&value)?.ok_or_else(|| {
            TemporalError::InvalidArgument("value does not describe a known pattern type".into())
        })
    }
}

impl Serialize for TemporalExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TemporalExpression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let options = OptionMap::deserialize(deserializer)?;
        TemporalExpression::create(&options)
            .map_err(D::Error::custom)?
            .ok_or_else(|| D::Error::custom("unknown or missing pattern type"))
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 date or datetime into a calendar date.
///
/// RFC 3339 values carry an offset and are converted into `timezone` first.
/// Naive datetimes (`T` or space separated) and plain dates are read as-is.
pub fn parse_date(input: &str, timezone: Tz) -> Result<NaiveDate> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&timezone).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(datetime.date());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| TemporalError::InvalidDate(format!("'{}': {}", input, e)))
}

/// Format a date as the UTC instant of its local start of day in `timezone`,
/// e.g. `2021-01-01T00:00:00.000000Z` for UTC.
///
/// A day the zone skipped entirely (Pacific/Apia on 2011-12-30) has no
/// instant, so it is written as a plain `YYYY-MM-DD` that [`parse_date`]
/// reads back unchanged.
pub fn format_date(date: NaiveDate, timezone: Tz) -> String {
    match local_start_of_day(date, timezone) {
        Some(instant) => instant
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        None => date.format("%Y-%m-%d").to_string(),
    }
}

/// First instant of `date` in `timezone`. Clocks that skip midnight start
/// the day at the first whole hour after the gap.
fn local_start_of_day(date: NaiveDate, timezone: Tz) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24)
        .map(|hour| midnight + Duration::hours(hour))
        .find_map(|local| timezone.from_local_datetime(&local).earliest())
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

/// A key's value, treating null as absent.
fn present<'a>(options: &'a OptionMap, key: &str) -> Option<&'a Value> {
    options.get(key).filter(|value| !value.is_null())
}

fn date_value(value: &Value, field: &'static str, timezone: Tz) -> Result<NaiveDate> {
    let text = value
        .as_str()
        .ok_or_else(|| TemporalError::field(field, "expected an ISO 8601 date string"))?;
    parse_date(text, timezone)
}

fn optional_date(options: &OptionMap, field: &'static str, timezone: Tz) -> Result<Option<NaiveDate>> {
    present(options, field)
        .map(|value| date_value(value, field, timezone))
        .transpose()
}

fn optional_timezone(options: &OptionMap) -> Result<Option<Tz>> {
    present(options, keys::TIMEZONE)
        .map(|value| {
            let name = value
                .as_str()
                .ok_or_else(|| TemporalError::field(keys::TIMEZONE, "expected an IANA zone name"))?;
            name.parse::<Tz>()
                .map_err(|_| TemporalError::InvalidTimezone(name.to_string()))
        })
        .transpose()
}

fn required_int<T: TryFrom<i64>>(options: &OptionMap, field: &'static str) -> Result<T> {
    let value = present(options, field).ok_or(TemporalError::MissingField(field))?;
    let number = value
        .as_i64()
        .ok_or_else(|| TemporalError::field(field, format!("expected an integer, got {}", value)))?;
    T::try_from(number).map_err(|_| TemporalError::field(field, format!("{} is out of range", number)))
}

/// Read `days` as a single integer or an array of integers.
fn weekdays(value: Option<&Value>) -> Result<Vec<u32>> {
    let to_weekday = |value: &Value| -> Result<u32> {
        value
            .as_i64()
            .and_then(|day| u32::try_from(day).ok())
            .ok_or_else(|| {
                TemporalError::InvalidWeekdays(format!(
                    "expected int[]|int, got {} element",
                    value_kind(value)
                ))
            })
    };

    match value {
        None | Some(Value::Null) => Err(TemporalError::MissingField(keys::DAYS)),
        Some(Value::Array(items)) => items.iter().map(to_weekday).collect(),
        Some(number @ Value::Number(_)) => Ok(vec![to_weekday(number)?]),
        Some(other) => Err(TemporalError::InvalidWeekdays(format!(
            "expected int[]|int, got {}",
            value_kind(other)
        ))),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
