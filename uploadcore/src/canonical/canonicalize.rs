//! Coerces raw upload values into the canonical form of their declared type.

use num_traits::{ToPrimitive, Zero};
use serde_json::Value;

use super::numbers;
use super::result::CanonicalizationResult;
use super::temporal;
use crate::fields::FieldType;
use crate::naming;

/// Short JSON-level description of a value for error messages.
fn describe(value: &Value) -> String {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("{kind} {value}")
}

fn invalid(value: &Value, field_type: FieldType, reason: &str) -> CanonicalizationResult {
    CanonicalizationResult::invalid(format!(
        "Invalid {field_type} value {}: {reason}",
        describe(value)
    ))
}

fn valid(value: Value) -> CanonicalizationResult {
    CanonicalizationResult::valid(Some(value))
}

/// Canonicalizes `value` for a field declared as `field_type`.
///
/// An absent value or JSON null is always valid and returned as is. Failures
/// are reported in the result, never panicked or returned as errors. The input
/// is not modified.
#[must_use]
pub fn canonicalize(value: Option<&Value>, field_type: FieldType) -> CanonicalizationResult {
    let value = match value {
        None => return CanonicalizationResult::valid(None),
        Some(Value::Null) => return valid(Value::Null),
        Some(value) => value,
    };

    match field_type {
        // Uploaded out of line later; the uploader replaces them with a reference.
        FieldType::AttachmentBlob
        | FieldType::AttachmentCsv
        | FieldType::AttachmentJsonBlob
        | FieldType::AttachmentJsonTable
        | FieldType::AttachmentV2
        | FieldType::LargeTextAttachment
        | FieldType::InlineJsonBlob => valid(value.clone()),
        FieldType::Boolean => canonicalize_boolean(value),
        FieldType::CalendarDate => canonicalize_calendar_date(value),
        FieldType::DurationV2 => canonicalize_duration(value),
        FieldType::Float => canonicalize_float(value),
        FieldType::Int => canonicalize_int(value),
        FieldType::MultiChoice => canonicalize_multi_choice(value),
        FieldType::SingleChoice => canonicalize_single_choice(value),
        FieldType::String => valid(to_string_value(value)),
        FieldType::TimeV2 => canonicalize_time(value),
        FieldType::Timestamp => canonicalize_timestamp(value),
    }
}

/// Text of a value: strings as is, anything else as its JSON serialization.
#[must_use]
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// STRING form of a value. JSON null stays null.
#[must_use]
pub fn to_string_value(value: &Value) -> Value {
    match value {
        Value::Null | Value::String(_) => value.clone(),
        other => Value::String(other.to_string()),
    }
}

fn canonicalize_boolean(value: &Value) -> CanonicalizationResult {
    match value {
        Value::Bool(_) => valid(value.clone()),
        Value::Number(n) if numbers::is_integral(n) => match numbers::number_to_integer(n) {
            Some(integer) => valid(Value::Bool(!integer.is_zero())),
            None => invalid(value, FieldType::Boolean, "number out of range"),
        },
        Value::String(s) if s.is_empty() => invalid(value, FieldType::Boolean, "empty string"),
        Value::String(s) if s.eq_ignore_ascii_case("true") => valid(Value::Bool(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => valid(Value::Bool(false)),
        Value::String(_) => invalid(value, FieldType::Boolean, "expected \"true\" or \"false\""),
        _ => invalid(value, FieldType::Boolean, "unsupported JSON type"),
    }
}

fn integer_value(value: &Value, field_type: FieldType, text: &str) -> CanonicalizationResult {
    let Some(decimal) = numbers::parse_decimal(text) else {
        return invalid(value, field_type, "not a number");
    };
    numbers::truncate(&decimal)
        .and_then(|integer| numbers::number_from_integer(&integer))
        .map_or_else(
            || invalid(value, field_type, "number out of range"),
            |number| valid(Value::Number(number)),
        )
}

fn canonicalize_int(value: &Value) -> CanonicalizationResult {
    match value {
        Value::Number(n) if numbers::is_integral(n) => valid(value.clone()),
        Value::Number(n) => integer_value(value, FieldType::Int, &n.to_string()),
        Value::String(s) if s.is_empty() => invalid(value, FieldType::Int, "empty string"),
        Value::String(s) => integer_value(value, FieldType::Int, s),
        _ => invalid(value, FieldType::Int, "unsupported JSON type"),
    }
}

fn canonicalize_float(value: &Value) -> CanonicalizationResult {
    match value {
        Value::Number(_) => valid(value.clone()),
        Value::String(s) if s.is_empty() => invalid(value, FieldType::Float, "empty string"),
        Value::String(s) => {
            let Some(decimal) = numbers::parse_decimal(s) else {
                return invalid(value, FieldType::Float, "not a number");
            };
            numbers::number_from_decimal_text(s, &decimal).map_or_else(
                || invalid(value, FieldType::Float, "number out of range"),
                |number| valid(Value::Number(number)),
            )
        }
        _ => invalid(value, FieldType::Float, "unsupported JSON type"),
    }
}

fn canonicalize_calendar_date(value: &Value) -> CanonicalizationResult {
    let Value::String(s) = value else {
        return invalid(value, FieldType::CalendarDate, "expected a string");
    };
    match temporal::parse_calendar_date(s) {
        Ok(date) => valid(Value::String(temporal::format_calendar_date(&date))),
        Err(err) => invalid(value, FieldType::CalendarDate, &err.to_string()),
    }
}

fn canonicalize_duration(value: &Value) -> CanonicalizationResult {
    match value {
        Value::String(s) if s.is_empty() => invalid(value, FieldType::DurationV2, "empty string"),
        Value::String(s) if temporal::is_valid_iso_duration(s) => valid(value.clone()),
        Value::String(_) => invalid(value, FieldType::DurationV2, "not an ISO-8601 duration"),
        _ => invalid(value, FieldType::DurationV2, "expected a string"),
    }
}

fn canonicalize_time(value: &Value) -> CanonicalizationResult {
    let Value::String(s) = value else {
        return invalid(value, FieldType::TimeV2, "expected a string");
    };
    let time = temporal::parse_timestamp(s)
        .map(|dt| dt.time())
        .or_else(|_| temporal::parse_local_time(s));
    match time {
        Ok(time) => valid(Value::String(temporal::format_local_time(&time))),
        Err(err) => invalid(value, FieldType::TimeV2, &err.to_string()),
    }
}

fn canonicalize_timestamp(value: &Value) -> CanonicalizationResult {
    match value {
        Value::Number(n) => {
            let formatted = numbers::number_to_integer(n)
                .and_then(|millis| millis.to_i64())
                .and_then(temporal::from_epoch_millis)
                .map(|dt| temporal::format_timestamp(&dt));
            match formatted {
                Some(text) => valid(Value::String(text)),
                None => invalid(value, FieldType::Timestamp, "epoch milliseconds out of range"),
            }
        }
        Value::String(s) => match temporal::parse_timestamp(s) {
            Ok(dt) => valid(Value::String(temporal::format_timestamp(&dt))),
            Err(err) => invalid(value, FieldType::Timestamp, &err.to_string()),
        },
        _ => invalid(value, FieldType::Timestamp, "unsupported JSON type"),
    }
}

fn canonicalize_single_choice(value: &Value) -> CanonicalizationResult {
    match value {
        Value::Array(elements) if elements.len() == 1 => valid(to_string_value(&elements[0])),
        Value::Array(elements) => invalid(
            value,
            FieldType::SingleChoice,
            &format!("expected exactly one answer, got {}", elements.len()),
        ),
        other => valid(to_string_value(other)),
    }
}

fn canonicalize_multi_choice(value: &Value) -> CanonicalizationResult {
    let Value::Array(elements) = value else {
        return invalid(value, FieldType::MultiChoice, "expected an array");
    };
    let answers = elements
        .iter()
        .map(|element| Value::String(naming::sanitize(&value_as_text(element))))
        .collect();
    valid(Value::Array(answers))
}
