//! Canonicalization of whole upload records against a field list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use crate::canonical::canonicalize;
use crate::fields::FieldDefinition;
use crate::naming::sanitize_field_name;

/// A validation failure for one field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Field the failure belongs to.
    pub field: String,
    /// What went wrong.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Canonical values of a record plus every field that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCanonicalization {
    /// Canonical values keyed by field name. Failed and absent fields are left out.
    pub values: Map<String, Value>,
    /// One entry per failed field, in field list order.
    pub errors: Vec<FieldError>,
}

impl RecordCanonicalization {
    /// True if every field canonicalized.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The canonical values, or every failure.
    pub fn into_result(self) -> Result<Map<String, Value>, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(self.values)
        } else {
            Err(self.errors)
        }
    }
}

/// Canonicalizes every declared field of `record`.
///
/// Record keys are sanitized before lookup. Each field is handled on its own,
/// so one bad value doesn't hide the others. A required field that is absent
/// or null is a failure. Keys that match no declared field are dropped.
#[must_use]
pub fn canonicalize_record(
    fields: &[FieldDefinition],
    record: &Map<String, Value>,
) -> RecordCanonicalization {
    let mut sanitized = Map::with_capacity(record.len());
    for (key, value) in record {
        let name = sanitize_field_name(key);
        if sanitized.insert(name.clone(), value.clone()).is_some() {
            debug!(key = %key, field = %name, "Record keys collide after sanitizing, keeping the last");
        }
    }

    let mut result = RecordCanonicalization::default();

    for field in fields {
        let value = sanitized.get(&field.name).filter(|v| !v.is_null());

        let Some(value) = value else {
            if field.required {
                debug!(field = %field.name, "Required field is missing");
                result
                    .errors
                    .push(FieldError::new(&field.name, "Required field is missing"));
            }
            continue;
        };

        let Some(field_type) = field.field_type else {
            result
                .errors
                .push(FieldError::new(&field.name, "Field has no declared type"));
            continue;
        };

        let canonical = canonicalize(Some(value), field_type);
        match canonical.into_result() {
            Ok(Some(canonical)) => {
                result.values.insert(field.name.clone(), canonical);
            }
            Ok(None) => {}
            Err(message) => {
                debug!(
                    field = %field.name,
                    field_type = %field_type,
                    error = %message,
                    "Field value failed canonicalization"
                );
                result.errors.push(FieldError::new(&field.name, message));
            }
        }
    }

    let declared: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    for key in sanitized.keys() {
        if !declared.contains(key.as_str()) {
            debug!(key = %key, "Dropping undeclared record key");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("record.id", FieldType::String),
            FieldDefinition::new("count", FieldType::Int),
            FieldDefinition::new("happy", FieldType::Boolean).with_required(false),
            FieldDefinition::new("when", FieldType::Timestamp).with_required(false),
        ]
    }

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_valid_record() {
        let input = record(json!({
            "record.id": "r1",
            "count": "12.7",
            "happy": "TRUE",
            "when": "2016-06-01T16:00-0700",
        }));

        let result = canonicalize_record(&fields(), &input);
        assert!(result.is_valid());
        assert_eq!(
            Value::Object(result.into_result().unwrap()),
            json!({
                "record.id": "r1",
                "count": 12,
                "happy": true,
                "when": "2016-06-01T23:00:00.000Z",
            })
        );
    }

    #[test]
    fn test_errors_name_every_failed_field() {
        let input = record(json!({
            "record.id": 42,
            "count": "twelve",
            "happy": "Yes",
        }));

        let result = canonicalize_record(&fields(), &input);
        assert_eq!(result.values.get("record.id"), Some(&json!("42")));

        let failed: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(failed, vec!["count", "happy"]);
        assert!(result.errors[0].message.contains("INT"));
        assert!(result.errors[1].to_string().starts_with("happy: Invalid BOOLEAN"));
    }

    #[test]
    fn test_required_fields() {
        let input = record(json!({ "record.id": null }));

        let errors = canonicalize_record(&fields(), &input).into_result().unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("record.id", "Required field is missing"),
                FieldError::new("count", "Required field is missing"),
            ]
        );
    }

    #[test]
    fn test_optional_null_is_left_out() {
        let input = record(json!({ "record.id": "r1", "count": 1, "happy": null }));
        let values = canonicalize_record(&fields(), &input).into_result().unwrap();
        assert!(!values.contains_key("happy"));
        assert!(!values.contains_key("when"));
    }

    #[test]
    fn test_keys_are_sanitized_and_extras_dropped() {
        let input = record(json!({
            "record.id": "r1",
            "count": 3,
            "sanitize!@#$this": "foo",
            "extra": "ignored",
        }));
        let mut fields = fields();
        fields.push(FieldDefinition::new("sanitize____this", FieldType::String));

        let values = canonicalize_record(&fields, &input).into_result().unwrap();
        assert_eq!(values.get("sanitize____this"), Some(&json!("foo")));
        assert!(!values.contains_key("extra"));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_colliding_keys_keep_one_value() {
        let input = record(json!({ "record.id": "r1", "count": 1, "a!b": "first", "a$b": "second" }));
        let mut fields = fields();
        fields.push(FieldDefinition::new("a_b", FieldType::String));

        let values = canonicalize_record(&fields, &input).into_result().unwrap();
        let kept = values.get("a_b").unwrap();
        assert!(kept == &json!("first") || kept == &json!("second"), "{kept}");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_untyped_field_fails() {
        let fields = vec![FieldDefinition::untyped("foo")];
        let input = record(json!({ "foo": 1 }));
        let errors = canonicalize_record(&fields, &input).errors;
        assert_eq!(errors, vec![FieldError::new("foo", "Field has no declared type")]);
    }

    #[test]
    fn test_input_is_not_modified() {
        let input = record(json!({ "count": "5", "bad key": 1 }));
        let before = input.clone();
        let _ = canonicalize_record(&fields(), &input);
        assert_eq!(input, before);
    }
}
