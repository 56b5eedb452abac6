//! Field name and answer choice rules.
//!
//! Both field names and multi-choice answers become column names in the
//! downstream table store, so they share one character class: ASCII letters
//! and digits, separated by single special characters (space, `.`, `-`, `_`).
//! A name may not start or end with a special character.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Longest accepted field name or answer choice, in characters.
pub const MAX_NAME_LENGTH: usize = 128;

/// Names of implicit columns in the table store. Matched case-insensitively.
pub const RESERVED_FIELD_NAMES: [&str; 3] = ["row_etag", "row_id", "row_version"];

static VALID_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]+(?:[ ._\-][A-Za-z0-9]+)*$").expect("name pattern is valid")
});

const fn is_legal_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_special_char(c)
}

const fn is_special_char(c: char) -> bool {
    matches!(c, ' ' | '.' | '-' | '_')
}

/// True if `answer` may be used as a multi-choice answer.
#[must_use]
pub fn is_valid_answer_choice(answer: &str) -> bool {
    answer.chars().count() <= MAX_NAME_LENGTH && VALID_NAME.is_match(answer)
}

/// True if `name` may be used as a schema field name.
///
/// Same rules as answer choices, and reserved column names are rejected.
#[must_use]
pub fn is_valid_field_name(name: &str) -> bool {
    is_valid_answer_choice(name)
        && !RESERVED_FIELD_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Rewrites a multi-choice answer into the legal character class.
///
/// Each run of illegal characters becomes a single `_`, each run of special
/// characters is reduced to its first character, and a leading `.` becomes
/// `_`. Applying it twice gives the same result as applying it once.
#[must_use]
pub fn sanitize(answer: &str) -> String {
    let mut replaced = String::with_capacity(answer.len());
    let mut in_illegal_run = false;
    for c in answer.chars() {
        if is_legal_char(c) {
            replaced.push(c);
            in_illegal_run = false;
        } else if !in_illegal_run {
            replaced.push('_');
            in_illegal_run = true;
        }
    }

    let mut sanitized = String::with_capacity(replaced.len());
    let mut previous_special = false;
    for c in replaced.chars() {
        let special = is_special_char(c);
        if !(special && previous_special) {
            sanitized.push(c);
        }
        previous_special = special;
    }

    if sanitized.starts_with('.') {
        sanitized.replace_range(..1, "_");
    }
    sanitized
}

/// Replaces every illegal character in a record key with `_`, one for one.
#[must_use]
pub fn sanitize_field_name(name: &str) -> String {
    name.chars()
        .map(|c| if is_legal_char(c) { c } else { '_' })
        .collect()
}

/// Returns a copy of `map` with every key passed through [`sanitize_field_name`].
#[must_use]
pub fn sanitize_field_names<V: Clone>(map: &HashMap<String, V>) -> HashMap<String, V> {
    map.iter()
        .map(|(key, value)| (sanitize_field_name(key), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invalid_for_both() {
        let cases = [
            "", "   ", "_foo", "foo_", "-foo", "foo-", ".foo", "foo.", " foo", "foo ", "foo*bar",
            "foo__bar", "foo--bar", "foo..bar", "foo  bar", "foo-_-bar", "föo",
        ];
        for case in cases {
            assert!(!is_valid_answer_choice(case), "{case:?} should be invalid answer choice");
            assert!(!is_valid_field_name(case), "{case:?} should be invalid field name");
        }
    }

    #[test]
    fn test_reserved_names_are_valid_answers_only() {
        for case in ["row_etag", "row_id", "row_ID", "row_version", "Row_Version"] {
            assert!(is_valid_answer_choice(case), "{case} should be valid answer choice");
            assert!(!is_valid_field_name(case), "{case} should be invalid field name");
        }
    }

    #[test]
    fn test_valid_for_both() {
        let cases = [
            "foo",
            "foo_bar",
            "foo-bar",
            "foo.bar",
            "foo bar",
            "foo-bar_baz.qwerty asdf",
            "select",
            "where",
            "time",
            "true",
            "false",
            "row_id_2",
        ];
        for case in cases {
            assert!(is_valid_answer_choice(case), "{case} should be valid answer choice");
            assert!(is_valid_field_name(case), "{case} should be valid field name");
        }
    }

    #[test]
    fn test_length_limit() {
        let at_limit = "a".repeat(MAX_NAME_LENGTH);
        assert!(is_valid_field_name(&at_limit));

        let too_long = "abcdefghij".repeat(13);
        assert!(!is_valid_answer_choice(&too_long));
        assert!(!is_valid_field_name(&too_long));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(".foo..bar"), "_foo.bar");
        assert_eq!(sanitize("$baz"), "_baz");
        assert_eq!(sanitize("Don't Know"), "Don_t Know");
        assert_eq!(sanitize("a!@#b"), "a_b");
        assert_eq!(sanitize("a $b"), "a b");
        assert_eq!(sanitize("already valid"), "already valid");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for case in [".foo..bar", "$baz", "._-x", "Don't Know", "", "***"] {
            let once = sanitize(case);
            assert_eq!(sanitize(&once), once, "{case:?}");
        }
    }

    #[test]
    fn test_sanitize_field_names() {
        let mut input = HashMap::new();
        input.insert("foo".to_string(), "bar");
        input.insert("sanitize!@#$this".to_string(), "sanitize this's value");

        let output = sanitize_field_names(&input);
        assert_eq!(output.len(), 2);
        assert_eq!(output.get("foo"), Some(&"bar"));
        assert_eq!(output.get("sanitize____this"), Some(&"sanitize this's value"));
        assert!(input.contains_key("sanitize!@#$this"));
    }
}
