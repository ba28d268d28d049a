//! Field rules for raw option maps and the checker that applies them.

use serde_json::json;
use temporal_expr::{validate, validation_rules, Constraint, TemporalExpression, Violation};

fn messages(result: Result<(), Vec<Violation>>) -> Vec<String> {
    result
        .expect_err("expected violations")
        .iter()
        .map(ToString::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// validation_rules
// ---------------------------------------------------------------------------

#[test]
fn rules_cover_every_option_key() {
    let paths: Vec<String> = validation_rules(None).into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "type",
            "start",
            "end",
            "frequency",
            "ignore_dates",
            "ignore_dates.*",
            "timezone",
            "day_of_month",
            "day_of_week",
            "week_of_month",
            "day",
            "month",
            "days",
            "days.*",
        ]
    );
}

#[test]
fn prefix_roots_paths_and_references() {
    let rules = validation_rules(Some("options.recurrence_pattern"));
    assert!(rules
        .iter()
        .all(|rule| rule.path.starts_with("options.recurrence_pattern.")));

    let end = rules
        .iter()
        .find(|rule| rule.path == "options.recurrence_pattern.end")
        .unwrap();
    assert!(end.constraints.contains(&Constraint::AfterOrEqual {
        field: "options.recurrence_pattern.start".into()
    }));

    let day = rules
        .iter()
        .find(|rule| rule.path == "options.recurrence_pattern.day")
        .unwrap();
    assert!(day.constraints.contains(&Constraint::RequiredIf {
        field: "options.recurrence_pattern.type".into(),
        value: "Day of Year".into(),
    }));
}

#[test]
fn empty_prefix_is_no_prefix() {
    assert_eq!(validation_rules(Some("")), validation_rules(None));
}

#[test]
fn rules_serialize_with_rule_tag() {
    let rules = serde_json::to_value(validation_rules(None)).unwrap();
    assert_eq!(
        rules[3],
        json!({
            "path": "frequency",
            "constraints": [
                {"rule": "nullable"},
                {"rule": "integer"},
                {"rule": "min", "min": 1},
                {"rule": "max", "max": 4294967295u64},
            ],
        })
    );
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn valid_documents_pass() {
    let documents = [
        json!({"type": "Days", "start": "2021-01-01"}),
        json!({
            "type": "Day of Year",
            "start": "2021-01-01T00:00:00.000000Z",
            "end": "2025-01-01",
            "frequency": 2,
            "timezone": "Europe/Paris",
            "day": 29,
            "month": 2,
        }),
        json!({"type": "Days of Week", "start": "2021-01-01", "days": [1, 5], "ignore_dates": ["2021-01-04"]}),
        json!({"type": "Day of Week of Month", "start": "2021-01-01", "day_of_week": 5, "week_of_month": -1}),
        json!({"type": "Day of Month", "start": "2021-01-01", "day_of_month": -1, "end": null}),
    ];
    for document in documents {
        assert_eq!(validate(&document, None), Ok(()), "document {}", document);
    }
}

#[test]
fn missing_type_and_start_are_reported() {
    let errors = messages(validate(&json!({}), None));
    assert_eq!(errors, vec!["type: is required", "start: is required"]);
}

#[test]
fn unknown_type_lists_allowed_values() {
    let errors = messages(validate(&json!({"type": "Hourly", "start": "2021-01-01"}), None));
    assert_eq!(
        errors,
        vec!["type: must be one of: Day of Month, Day of Week of Month, Day of Year, Days, Days of Week"]
    );
}

#[test]
fn variant_fields_are_required_for_their_type() {
    let errors = messages(validate(
        &json!({"type": "Day of Week of Month", "start": "2021-01-01"}),
        None,
    ));
    assert_eq!(
        errors,
        vec![
            "day_of_week: is required when type is Day of Week of Month",
            "week_of_month: is required when type is Day of Week of Month",
        ]
    );
}

#[test]
fn ranges_and_types_are_checked() {
    let errors = messages(validate(
        &json!({
            "type": "Day of Month",
            "start": "yesterday",
            "end": "2020-01-01",
            "frequency": 0,
            "timezone": "Nowhere/Special",
            "day_of_month": 0,
        }),
        None,
    ));
    assert_eq!(
        errors,
        vec![
            "start: must be an ISO 8601 date",
            "frequency: must be at least 1",
            "timezone: must be a valid IANA timezone",
            "day_of_month: must not be 0",
        ]
    );
}

#[test]
fn ranges_match_what_the_factory_accepts() {
    let errors = messages(validate(
        &json!({
            "type": "Day of Month",
            "start": "2021-01-01",
            "frequency": 4294967296u64,
            "day_of_month": 40,
        }),
        None,
    ));
    assert_eq!(
        errors,
        vec![
            "frequency: must be at most 4294967295",
            "day_of_month: must be between -31 and 31",
        ]
    );

    let edge = json!({
        "type": "Day of Month",
        "start": "2021-01-01",
        "frequency": 4294967295u64,
        "day_of_month": -31,
    });
    assert_eq!(validate(&edge, None), Ok(()));
    assert!(TemporalExpression::create(edge.as_object().unwrap()).unwrap().is_some());
}

#[test]
fn end_before_start_is_reported() {
    let errors = messages(validate(
        &json!({"type": "Days", "start": "2021-01-02", "end": "2021-01-01"}),
        None,
    ));
    assert_eq!(errors, vec!["end: must not be before start"]);
}

#[test]
fn array_elements_are_checked_individually() {
    let errors = messages(validate(
        &json!({
            "type": "Days of Week",
            "start": "2021-01-01",
            "ignore_dates": ["2021-01-04", "soon"],
            "days": [1, 8, "fri"],
        }),
        None,
    ));
    assert_eq!(
        errors,
        vec![
            "ignore_dates.1: must be an ISO 8601 date",
            "days.1: must be between 1 and 7",
            "days.2: must be an integer, got string",
        ]
    );
}

#[test]
fn weekday_list_must_be_non_empty_and_distinct() {
    let errors = messages(validate(
        &json!({"type": "Days of Week", "start": "2021-01-01", "days": []}),
        None,
    ));
    assert_eq!(errors, vec!["days: must have at least 1 element(s)"]);

    let errors = messages(validate(
        &json!({"type": "Days of Week", "start": "2021-01-01", "days": [2, 2]}),
        None,
    ));
    assert_eq!(errors, vec!["days: must not contain duplicates"]);
}

#[test]
fn nested_document_is_validated_under_prefix() {
    let document = json!({
        "title": "standup",
        "options": {
            "recurrence_pattern": {
                "type": "Day of Year",
                "start": "2021-01-01",
                "day": 32,
                "month": 12,
            }
        }
    });
    let errors = messages(validate(&document, Some("options.recurrence_pattern")));
    assert_eq!(
        errors,
        vec!["options.recurrence_pattern.day: must be between 1 and 31"]
    );
}

#[test]
fn missing_nested_map_reports_required_fields() {
    let errors = messages(validate(&json!({"options": {}}), Some("options.recurrence_pattern")));
    assert_eq!(
        errors,
        vec![
            "options.recurrence_pattern.type: is required",
            "options.recurrence_pattern.start: is required",
        ]
    );
}
