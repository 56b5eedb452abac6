//! In-place compatibility of two versions of one field definition.
//!
//! A change is compatible when every value ingested under the old definition
//! is still valid under the new one and fits the table column the old
//! definition produced.

use crate::fields::{FieldDefinition, FieldType};

fn type_name(field_type: Option<FieldType>) -> &'static str {
    field_type.map_or("unset", FieldType::as_str)
}

/// A flag turned off after being on. Absent and `false` are both "off".
fn turned_off(old: Option<bool>, new: Option<bool>) -> bool {
    old == Some(true) && new != Some(true)
}

fn check_max_length(old: &FieldDefinition, new: &FieldDefinition, problems: &mut Vec<String>) {
    if new.is_unbounded_text() {
        return;
    }
    let old_length = old.effective_max_length();
    let new_length = new.effective_max_length();
    if new_length < old_length {
        problems.push(format!("maxLength shrinks from {old_length} to {new_length}"));
    }
}

fn check_type(old: &FieldDefinition, new: &FieldDefinition, problems: &mut Vec<String>) {
    match (old.field_type, new.field_type) {
        (old_type, new_type) if old_type == new_type => {
            if new_type.is_some_and(FieldType::is_string_like) {
                check_max_length(old, new, problems);
            }
        }
        (Some(FieldType::Int), Some(FieldType::Float)) => {}
        (Some(old_type), Some(FieldType::String)) => {
            if let Some(width) = old_type.canonical_text_width() {
                let new_length = new.effective_max_length();
                if !new.is_unbounded_text() && new_length <= width {
                    problems.push(format!(
                        "maxLength {new_length} is too short for {old_type} values converted to STRING"
                    ));
                }
            } else if old_type.is_string_like() {
                check_max_length(old, new, problems);
            } else {
                problems.push(format!("type changed from {old_type} to STRING"));
            }
        }
        (old_type, new_type) => problems.push(format!(
            "type changed from {} to {}",
            type_name(old_type),
            type_name(new_type)
        )),
    }
}

/// Lists every reason `new` can't replace `old` in place. Empty when compatible.
#[must_use]
pub fn field_incompatibilities(old: &FieldDefinition, new: &FieldDefinition) -> Vec<String> {
    let mut problems = Vec::new();
    if old == new {
        return problems;
    }

    if old.name != new.name {
        problems.push(format!("name changed from '{}' to '{}'", old.name, new.name));
    }

    check_type(old, new, &mut problems);

    if turned_off(old.allow_other_choices, new.allow_other_choices) {
        problems.push("allowOtherChoices turned off".to_string());
    }
    if turned_off(old.unbounded_text, new.unbounded_text) {
        problems.push("unboundedText turned off".to_string());
    }

    if let Some(old_answers) = &old.multi_choice_answer_list {
        let new_answers = new.multi_choice_answer_list.as_deref().unwrap_or_default();
        let removed: Vec<&str> = old_answers
            .iter()
            .filter(|answer| !new_answers.contains(answer))
            .map(String::as_str)
            .collect();
        if !removed.is_empty() {
            problems.push(format!(
                "multiChoiceAnswerList removes {}",
                removed.join(", ")
            ));
        }
    }

    problems
}

/// True if `new` may replace `old` in a published schema without breaking
/// already-ingested data or the table layout.
///
/// `required`, `fileExtension` and `mimeType` never affect the verdict.
#[must_use]
pub fn is_compatible_field_def(old: &FieldDefinition, new: &FieldDefinition) -> bool {
    field_incompatibilities(old, new).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(field_type: FieldType) -> FieldDefinition {
        FieldDefinition::new("field", field_type)
    }

    #[test]
    fn test_basic_cases() {
        assert!(is_compatible_field_def(&field(FieldType::Int), &field(FieldType::Int)));
        assert!(is_compatible_field_def(
            &field(FieldType::AttachmentV2)
                .with_file_extension(".txt")
                .with_mime_type("text/plain"),
            &field(FieldType::AttachmentV2)
                .with_file_extension(".json")
                .with_mime_type("text/json"),
        ));
        assert!(!is_compatible_field_def(
            &field(FieldType::Int).with_required(false),
            &field(FieldType::Boolean),
        ));
        assert!(is_compatible_field_def(&field(FieldType::Int), &field(FieldType::String)));
        assert!(is_compatible_field_def(&field(FieldType::Int), &field(FieldType::Float)));
        assert!(!is_compatible_field_def(
            &FieldDefinition::new("foo-field", FieldType::Int),
            &FieldDefinition::new("bar-field", FieldType::Int),
        ));
    }

    #[test]
    fn test_reflexive() {
        let fields = [
            field(FieldType::Timestamp),
            field(FieldType::String).with_max_length(10),
            field(FieldType::String).with_unbounded_text(true),
            field(FieldType::MultiChoice)
                .with_answer_list(["a", "b"])
                .with_allow_other_choices(true),
            FieldDefinition::untyped("field"),
        ];
        for f in fields {
            assert!(is_compatible_field_def(&f, &f), "{f:?}");
        }
    }

    #[test]
    fn test_not_symmetric() {
        let int = field(FieldType::Int);
        let string_20 = field(FieldType::String).with_max_length(20);
        let string_21 = field(FieldType::String).with_max_length(21);

        assert!(!is_compatible_field_def(&int, &string_20));
        assert!(is_compatible_field_def(&int, &string_21));
        assert!(!is_compatible_field_def(&string_21, &int));
        assert!(!is_compatible_field_def(&field(FieldType::Float), &int));
    }

    #[test]
    fn test_boolean_flags() {
        // (old, new, expected)
        let cases = [
            (None, None, true),
            (None, Some(false), true),
            (None, Some(true), true),
            (Some(false), None, true),
            (Some(false), Some(false), true),
            (Some(false), Some(true), true),
            (Some(true), None, false),
            (Some(true), Some(false), false),
            (Some(true), Some(true), true),
        ];

        for (old, new, expected) in cases {
            let multi_choice = |allow: Option<bool>| {
                field(FieldType::MultiChoice)
                    .with_answer_list(["foo", "bar", "baz"])
                    .with_allow_other_choices(allow)
            };
            assert_eq!(
                is_compatible_field_def(&multi_choice(old), &multi_choice(new)),
                expected,
                "allowOtherChoices {old:?} -> {new:?}"
            );

            let text = |unbounded: Option<bool>| field(FieldType::String).with_unbounded_text(unbounded);
            assert_eq!(
                is_compatible_field_def(&text(old), &text(new)),
                expected,
                "unboundedText {old:?} -> {new:?}"
            );
        }
    }

    #[test]
    fn test_max_length() {
        // (old, new, expected)
        let cases = [
            (None, None, true),
            (None, Some(10), false),
            (None, Some(200), true),
            (Some(10), None, true),
            (Some(200), None, false),
            (Some(10), Some(10), true),
            (Some(10), Some(15), true),
            (Some(10), Some(5), false),
            (Some(999), Some(1000), true),
            (Some(1001), Some(1001), true),
            (Some(1000), Some(1001), true),
        ];

        for (old, new, expected) in cases {
            let old_field = field(FieldType::String).with_max_length(old);
            let new_field = field(FieldType::String).with_max_length(new);
            assert_eq!(
                is_compatible_field_def(&old_field, &new_field),
                expected,
                "maxLength {old:?} -> {new:?}"
            );
        }
    }

    #[test]
    fn test_max_length_with_non_strings() {
        // (old type, new type, new maxLength, expected)
        let cases = [
            (FieldType::Int, FieldType::Float, None, true),
            (FieldType::CalendarDate, FieldType::String, Some(9), false),
            (FieldType::CalendarDate, FieldType::String, Some(11), true),
            (FieldType::DurationV2, FieldType::String, Some(23), false),
            (FieldType::DurationV2, FieldType::String, Some(25), true),
            (FieldType::Float, FieldType::String, Some(21), false),
            (FieldType::Float, FieldType::String, Some(23), true),
            (FieldType::Int, FieldType::String, Some(19), false),
            (FieldType::Int, FieldType::String, Some(21), true),
            (FieldType::TimeV2, FieldType::String, Some(11), false),
            (FieldType::TimeV2, FieldType::String, Some(13), true),
            (FieldType::Boolean, FieldType::String, Some(100), false),
            (FieldType::Timestamp, FieldType::String, None, false),
        ];

        for (old_type, new_type, new_length, expected) in cases {
            let old_field = field(old_type);
            let new_field = field(new_type).with_max_length(new_length);
            assert_eq!(
                is_compatible_field_def(&old_field, &new_field),
                expected,
                "{old_type} -> {new_type}({new_length:?})"
            );
        }
    }

    #[test]
    fn test_string_like_into_string() {
        let single = field(FieldType::SingleChoice).with_max_length(50);
        assert!(is_compatible_field_def(&single, &field(FieldType::String).with_max_length(50)));
        assert!(!is_compatible_field_def(&single, &field(FieldType::String).with_max_length(40)));
        assert!(is_compatible_field_def(
            &single,
            &field(FieldType::String).with_unbounded_text(true)
        ));
    }

    #[test]
    fn test_answer_list() {
        let list = |answers: Option<&[&str]>| {
            let f = field(FieldType::MultiChoice);
            match answers {
                Some(answers) => f.with_answer_list(answers.iter().copied()),
                None => f,
            }
        };

        // (old, new, expected)
        let cases: [(Option<&[&str]>, Option<&[&str]>, bool); 7] = [
            (None, None, true),
            (None, Some(&["foo", "bar"]), true),
            (Some(&["foo", "bar"]), None, false),
            (Some(&["foo", "bar"]), Some(&["foo", "bar"]), true),
            (Some(&["foo", "bar"]), Some(&["foo"]), false),
            (Some(&["foo", "bar"]), Some(&["foo", "bar", "baz"]), true),
            (Some(&["foo", "bar"]), Some(&["foo", "baz"]), false),
        ];

        for (old, new, expected) in cases {
            assert_eq!(
                is_compatible_field_def(&list(old), &list(new)),
                expected,
                "{old:?} -> {new:?}"
            );
        }
    }

    #[test]
    fn test_required_never_matters() {
        for (old, new) in [(false, false), (true, true), (true, false), (false, true)] {
            assert!(is_compatible_field_def(
                &field(FieldType::Int).with_required(old),
                &field(FieldType::Int).with_required(new),
            ));
        }
    }

    #[test]
    fn test_untyped_to_typed_is_a_type_change() {
        let problems =
            field_incompatibilities(&FieldDefinition::untyped("field"), &field(FieldType::Int));
        assert_eq!(problems, vec!["type changed from unset to INT".to_string()]);
    }

    #[test]
    fn test_incompatibilities_lists_every_problem() {
        let old = field(FieldType::MultiChoice)
            .with_answer_list(["foo", "bar"])
            .with_allow_other_choices(true);
        let new = field(FieldType::MultiChoice).with_answer_list(["foo"]);

        let problems = field_incompatibilities(&old, &new);
        assert_eq!(
            problems,
            vec![
                "allowOtherChoices turned off".to_string(),
                "multiChoiceAnswerList removes bar".to_string(),
            ]
        );
    }
}
