//! Upload field definitions as stored in a schema.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::types::FieldType;
use crate::errors::FieldDefinitionError;
use crate::naming;

fn default_required() -> bool {
    true
}

/// Immutable description of one field in an upload schema.
///
/// Boolean flags are optional because stored schemas distinguish an absent
/// flag from an explicit `false`; both mean "off".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Field name, unique within a schema.
    pub name: String,
    /// Declared type. May be unset in malformed or in-progress schemas.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// Whether a record must carry a value for this field.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Maximum text length for string-like types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Unbounded text for string-like types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unbounded_text: Option<bool>,
    /// Ordered answer choices for multi-choice fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_choice_answer_list: Option<Vec<String>>,
    /// Whether multi-choice fields accept answers outside the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_other_choices: Option<bool>,
    /// File extension for `ATTACHMENT_V2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    /// MIME type for `ATTACHMENT_V2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FieldDefinition {
    /// Creates a required field of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::untyped(name)
        }
    }

    /// Creates a required field with no type.
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            required: true,
            max_length: None,
            unbounded_text: None,
            multi_choice_answer_list: None,
            allow_other_choices: None,
            file_extension: None,
            mime_type: None,
        }
    }

    /// Sets whether the field is required.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets or clears the maximum text length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: impl Into<Option<usize>>) -> Self {
        self.max_length = max_length.into();
        self
    }

    /// Sets or clears the unbounded text flag.
    #[must_use]
    pub fn with_unbounded_text(mut self, unbounded: impl Into<Option<bool>>) -> Self {
        self.unbounded_text = unbounded.into();
        self
    }

    /// Sets the multi-choice answer list.
    #[must_use]
    pub fn with_answer_list<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multi_choice_answer_list = Some(answers.into_iter().map(Into::into).collect());
        self
    }

    /// Sets or clears the allow-other-choices flag.
    #[must_use]
    pub fn with_allow_other_choices(mut self, allow: impl Into<Option<bool>>) -> Self {
        self.allow_other_choices = allow.into();
        self
    }

    /// Sets the attachment file extension.
    #[must_use]
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }

    /// Sets the attachment MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// True when `unboundedText` is explicitly on.
    #[must_use]
    pub fn is_unbounded_text(&self) -> bool {
        self.unbounded_text == Some(true)
    }

    /// True when `allowOtherChoices` is explicitly on.
    #[must_use]
    pub fn allows_other_choices(&self) -> bool {
        self.allow_other_choices == Some(true)
    }

    /// Checks the definition is structurally sound for its type.
    ///
    /// All problems are collected rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), FieldDefinitionError> {
        let mut problems = Vec::new();

        if !naming::is_valid_field_name(&self.name) {
            problems.push(format!("name '{}' is not a valid field name", self.name));
        }

        let Some(field_type) = self.field_type else {
            problems.push("type must be specified".to_string());
            return FieldDefinitionError::check(&self.name, problems);
        };

        if field_type == FieldType::MultiChoice {
            match &self.multi_choice_answer_list {
                None => problems.push("multiChoiceAnswerList must be specified".to_string()),
                Some(answers) => {
                    let mut seen = HashSet::new();
                    for answer in answers {
                        if !naming::is_valid_answer_choice(answer) {
                            problems.push(format!(
                                "multiChoiceAnswerList contains invalid answer choice '{answer}'"
                            ));
                        }
                        if !seen.insert(answer.as_str()) {
                            problems.push(format!(
                                "multiChoiceAnswerList contains duplicate answer choice '{answer}'"
                            ));
                        }
                    }
                }
            }
        } else if self.allow_other_choices.is_some() {
            problems.push(format!("allowOtherChoices is not allowed for {field_type}"));
        }

        if field_type.is_string_like() {
            if self.max_length == Some(0) {
                problems.push("maxLength must be positive".to_string());
            }
            if self.max_length.is_some() && self.is_unbounded_text() {
                problems.push("maxLength can't be specified with unboundedText".to_string());
            }
        } else {
            if self.max_length.is_some() {
                problems.push(format!("maxLength is not allowed for {field_type}"));
            }
            if self.unbounded_text.is_some() {
                problems.push(format!("unboundedText is not allowed for {field_type}"));
            }
        }

        if field_type != FieldType::AttachmentV2 {
            if self.file_extension.is_some() {
                problems.push(format!("fileExtension is not allowed for {field_type}"));
            }
            if self.mime_type.is_some() {
                problems.push(format!("mimeType is not allowed for {field_type}"));
            }
        }

        FieldDefinitionError::check(&self.name, problems)
    }
}
