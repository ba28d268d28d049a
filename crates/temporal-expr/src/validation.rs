//! Field constraints for raw option maps, and a checker that applies them.
//!
//! Hosts that accept patterns from user input can either export the rules
//! (`validation_rules`) to their own validation layer, or run `validate` on a
//! JSON document before handing the option map to the factory.
//!
//! Paths are dot separated; `*` matches every element of an array, so
//! `days.*` constrains each weekday number. With a prefix such as
//! `options.recurrence_pattern`, every path (including the ones referenced by
//! `RequiredIf` and `AfterOrEqual`) is rooted under it.

use std::collections::HashSet;

use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;

use crate::options::{keys, parse_date, value_kind};
use crate::pattern::PatternType;

/// A single constraint on a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Constraint {
    Required,
    /// Required when the field at `field` equals `value`.
    RequiredIf { field: String, value: String },
    Nullable,
    Integer,
    String,
    /// An ISO 8601 date or datetime string.
    Date,
    Array,
    /// An IANA zone name.
    Timezone,
    /// Integers: `value >= min`. Arrays: at least `min` elements.
    Min { min: i64 },
    /// Integers: `value <= max`.
    Max { max: i64 },
    Between { min: i64, max: i64 },
    In { values: Vec<String> },
    NotIn { values: Vec<i64> },
    /// Array elements are pairwise different.
    Distinct,
    /// A date not earlier than the date at `field`.
    AfterOrEqual { field: String },
}

/// Constraints attached to one field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    pub path: String,
    pub constraints: Vec<Constraint>,
}

/// A failed constraint at a concrete path (wildcards expanded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// The rules for every option key, optionally rooted under `prefix`.
pub fn validation_rules(prefix: Option<&str>) -> Vec<FieldRule> {
    use Constraint::*;

    let path = |key: &str| match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, key),
        _ => key.to_string(),
    };
    let required_for = |pattern_type: PatternType| RequiredIf {
        field: path(keys::TYPE),
        value: pattern_type.tag().to_string(),
    };
    let rule = |key: &str, constraints: Vec<Constraint>| FieldRule {
        path: path(key),
        constraints,
    };

    vec![
        rule(
            keys::TYPE,
            vec![
                Required,
                String,
                In {
                    values: PatternType::ALL.iter().map(|t| t.tag().to_string()).collect(),
                },
            ],
        ),
        rule(keys::START, vec![Required, Date]),
        rule(
            keys::END,
            vec![
                Nullable,
                Date,
                AfterOrEqual {
                    field: path(keys::START),
                },
            ],
        ),
        rule(
            keys::FREQUENCY,
            vec![
                Nullable,
                Integer,
                Min { min: 1 },
                Max {
                    max: i64::from(u32::MAX),
                },
            ],
        ),
        rule(keys::IGNORE_DATES, vec![Nullable, Array]),
        rule(&format!("{}.*", keys::IGNORE_DATES), vec![Date]),
        rule(keys::TIMEZONE, vec![Nullable, String, Timezone]),
        rule(
            keys::DAY_OF_MONTH,
            vec![
                required_for(PatternType::DayOfMonth),
                Integer,
                Between { min: -31, max: 31 },
                NotIn { values: vec![0] },
            ],
        ),
        rule(
            keys::DAY_OF_WEEK,
            vec![
                required_for(PatternType::DayOfWeekOfMonth),
                Integer,
                Between { min: 1, max: 7 },
            ],
        ),
        rule(
            keys::WEEK_OF_MONTH,
            vec![
                required_for(PatternType::DayOfWeekOfMonth),
                Integer,
                Between { min: -6, max: 6 },
                NotIn { values: vec![0] },
            ],
        ),
        rule(
            keys::DAY,
            vec![
                required_for(PatternType::DayOfYear),
                Integer,
                Between { min: 1, max: 31 },
            ],
        ),
        rule(
            keys::MONTH,
            vec![
                required_for(PatternType::DayOfYear),
                Integer,
                Between { min: 1, max: 12 },
            ],
        ),
        rule(
            keys::DAYS,
            vec![
                required_for(PatternType::DaysOfWeek),
                Array,
                Min { min: 1 },
                Distinct,
            ],
        ),
        rule(
            &format!("{}.*", keys::DAYS),
            vec![Integer, Between { min: 1, max: 7 }],
        ),
    ]
}

/// Check a JSON document against [`validation_rules`].
///
/// With a prefix, the option map is looked up at that path inside `document`.
/// Returns every violation found, in rule order.
pub fn validate(document: &Value, prefix: Option<&str>) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    for rule in validation_rules(prefix) {
        for (path, value) in resolve(document, &rule.path) {
            if let Some(message) = check(document, value, &rule.constraints) {
                violations.push(Violation { path, message });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// First failing constraint for one value, if any.
fn check(document: &Value, value: Option<&Value>, constraints: &[Constraint]) -> Option<String> {
    let value = value.filter(|v| !v.is_null());

    for constraint in constraints {
        match constraint {
            Constraint::Required if value.is_none() => return Some("is required".into()),
            Constraint::RequiredIf { field, value: expected } if value.is_none() => {
                let actual = lookup(document, field).and_then(Value::as_str);
                if actual == Some(expected.as_str()) {
                    return Some(format!("is required when {} is {}", field, expected));
                }
            }
            _ => {}
        }
    }

    // Absent optional fields pass every remaining constraint.
    let value = value?;
    constraints
        .iter()
        .find_map(|constraint| check_present(document, value, constraint))
}

fn check_present(document: &Value, value: &Value, constraint: &Constraint) -> Option<String> {
    let fail = |message: String| Some(message);
    match constraint {
        Constraint::Required | Constraint::RequiredIf { .. } | Constraint::Nullable => None,
        Constraint::Integer if value.as_i64().is_none() => {
            fail(format!("must be an integer, got {}", value_kind(value)))
        }
        Constraint::String if !value.is_string() => {
            fail(format!("must be a string, got {}", value_kind(value)))
        }
        Constraint::Array if !value.is_array() => {
            fail(format!("must be an array, got {}", value_kind(value)))
        }
        Constraint::Date => match value.as_str() {
            Some(text) if parse_date(text, Tz::UTC).is_ok() => None,
            _ => fail("must be an ISO 8601 date".into()),
        },
        Constraint::Timezone => match value.as_str() {
            Some(name) if name.parse::<Tz>().is_ok() => None,
            _ => fail("must be a valid IANA timezone".into()),
        },
        Constraint::Min { min } => match (value.as_i64(), value.as_array()) {
            (Some(n), _) if n < *min => fail(format!("must be at least {}", min)),
            (_, Some(items)) if (items.len() as i64) < *min => {
                fail(format!("must have at least {} element(s)", min))
            }
            _ => None,
        },
        Constraint::Max { max } => match value.as_i64() {
            Some(n) if n > *max => fail(format!("must be at most {}", max)),
            _ => None,
        },
        Constraint::Between { min, max } => match value.as_i64() {
            Some(n) if n < *min || n > *max => fail(format!("must be between {} and {}", min, max)),
            _ => None,
        },
        Constraint::In { values } => match value.as_str() {
            Some(text) if values.iter().any(|v| v == text) => None,
            _ => fail(format!("must be one of: {}", values.join(", "))),
        },
        Constraint::NotIn { values } => match value.as_i64() {
            Some(n) if values.contains(&n) => fail(format!("must not be {}", n)),
            _ => None,
        },
        Constraint::Distinct => {
            let items = value.as_array()?;
            let mut seen = HashSet::new();
            if items.iter().all(|item| seen.insert(item.to_string())) {
                None
            } else {
                fail("must not contain duplicates".into())
            }
        }
        Constraint::AfterOrEqual { field } => {
            let this = value.as_str().and_then(|t| parse_date(t, Tz::UTC).ok());
            let other = lookup(document, field)
                .and_then(Value::as_str)
                .and_then(|t| parse_date(t, Tz::UTC).ok());
            match (this, other) {
                (Some(this), Some(other)) if this < other => {
                    fail(format!("must not be before {}", field))
                }
                _ => None,
            }
        }
        Constraint::Integer | Constraint::String | Constraint::Array => None,
    }
}

/// Follow a concrete dot path (no wildcards).
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.as_object()?.get(segment))
}

/// Expand a rule path into concrete paths and their values.
///
/// Non-wildcard paths always resolve (to `None` when missing) so presence
/// rules can fire; wildcard segments expand to the elements that exist.
fn resolve<'a>(document: &'a Value, path: &str) -> Vec<(String, Option<&'a Value>)> {
    let mut resolved: Vec<(String, Option<&'a Value>)> = vec![(String::new(), Some(document))];

    for segment in path.split('.') {
        let mut next = Vec::new();
        for (prefix, value) in resolved {
            let join = |key: &str| {
                if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{}.{}", prefix, key)
                }
            };
            if segment == "*" {
                if let Some(items) = value.and_then(Value::as_array) {
                    for (index, item) in items.iter().enumerate() {
                        next.push((join(&index.to_string()), Some(item)));
                    }
                }
            } else {
                let child = value.and_then(Value::as_object).and_then(|o| o.get(segment));
                next.push((join(segment), child));
            }
        }
        resolved = next;
    }

    resolved
}
