//! The closed set of upload field types and their static storage tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::size::FieldSize;

/// Default text width assumed for string-like fields without a `maxLength`.
pub const DEFAULT_MAX_LENGTH: usize = 100;

/// Worst-case UTF-8 bytes per character in the downstream table store.
pub const BYTES_PER_CHARACTER: usize = 3;

/// Bytes reserved for unbounded text and large text attachments.
pub const UNBOUNDED_TEXT_BYTES: usize = 3000;

/// Bytes per multi-choice answer column (a boolean column).
pub const MULTI_CHOICE_ANSWER_BYTES: usize = 5;

/// Declared type of an upload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Opaque binary attachment.
    AttachmentBlob,
    /// CSV file attachment.
    AttachmentCsv,
    /// JSON attachment stored as a blob.
    AttachmentJsonBlob,
    /// JSON attachment with tabular content.
    AttachmentJsonTable,
    /// Attachment with file extension and MIME type metadata.
    AttachmentV2,
    /// Boolean.
    Boolean,
    /// Calendar date, `YYYY-MM-DD`.
    CalendarDate,
    /// ISO-8601 duration.
    DurationV2,
    /// Arbitrary-precision decimal.
    Float,
    /// Small JSON value stored inline.
    InlineJsonBlob,
    /// Arbitrary-precision integer.
    Int,
    /// Free text too large for an inline column.
    LargeTextAttachment,
    /// Zero or more answers from a declared answer list.
    MultiChoice,
    /// Exactly one answer.
    SingleChoice,
    /// Bounded text.
    String,
    /// Local time of day, `HH:MM:SS.mmm`.
    TimeV2,
    /// Instant in time with a UTC offset.
    Timestamp,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::AttachmentBlob,
        Self::AttachmentCsv,
        Self::AttachmentJsonBlob,
        Self::AttachmentJsonTable,
        Self::AttachmentV2,
        Self::Boolean,
        Self::CalendarDate,
        Self::DurationV2,
        Self::Float,
        Self::InlineJsonBlob,
        Self::Int,
        Self::LargeTextAttachment,
        Self::MultiChoice,
        Self::SingleChoice,
        Self::String,
        Self::TimeV2,
        Self::Timestamp,
    ];

    /// Returns the wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AttachmentBlob => "ATTACHMENT_BLOB",
            Self::AttachmentCsv => "ATTACHMENT_CSV",
            Self::AttachmentJsonBlob => "ATTACHMENT_JSON_BLOB",
            Self::AttachmentJsonTable => "ATTACHMENT_JSON_TABLE",
            Self::AttachmentV2 => "ATTACHMENT_V2",
            Self::Boolean => "BOOLEAN",
            Self::CalendarDate => "CALENDAR_DATE",
            Self::DurationV2 => "DURATION_V2",
            Self::Float => "FLOAT",
            Self::InlineJsonBlob => "INLINE_JSON_BLOB",
            Self::Int => "INT",
            Self::LargeTextAttachment => "LARGE_TEXT_ATTACHMENT",
            Self::MultiChoice => "MULTI_CHOICE",
            Self::SingleChoice => "SINGLE_CHOICE",
            Self::String => "STRING",
            Self::TimeV2 => "TIME_V2",
            Self::Timestamp => "TIMESTAMP",
        }
    }

    /// True for types whose values are stored out of line.
    #[must_use]
    pub const fn is_attachment(self) -> bool {
        matches!(
            self,
            Self::AttachmentBlob
                | Self::AttachmentCsv
                | Self::AttachmentJsonBlob
                | Self::AttachmentJsonTable
                | Self::AttachmentV2
                | Self::LargeTextAttachment
        )
    }

    /// True for types sized by `maxLength` / `unboundedText`.
    #[must_use]
    pub const fn is_string_like(self) -> bool {
        matches!(self, Self::String | Self::SingleChoice | Self::InlineJsonBlob)
    }

    /// Fixed storage cost, or `None` for types sized by their definition.
    #[must_use]
    pub const fn fixed_size(self) -> Option<FieldSize> {
        let (bytes, columns) = match self {
            Self::AttachmentBlob
            | Self::AttachmentCsv
            | Self::AttachmentJsonBlob
            | Self::AttachmentJsonTable
            | Self::AttachmentV2 => (20, 1),
            Self::Boolean => (5, 1),
            Self::CalendarDate => (30, 1),
            Self::DurationV2 => (72, 1),
            Self::Float => (23, 1),
            Self::Int => (20, 1),
            Self::LargeTextAttachment => (UNBOUNDED_TEXT_BYTES, 1),
            Self::TimeV2 => (36, 1),
            // value column plus the UTC offset companion column
            Self::Timestamp => (35, 2),
            Self::InlineJsonBlob | Self::MultiChoice | Self::SingleChoice | Self::String => {
                return None
            }
        };
        Some(FieldSize::new(bytes, columns))
    }

    /// Text width of the canonical form, for types that may widen into STRING.
    #[must_use]
    pub const fn canonical_text_width(self) -> Option<usize> {
        match self {
            Self::CalendarDate => Some(10),
            Self::TimeV2 => Some(12),
            Self::Int => Some(20),
            Self::Float => Some(22),
            Self::DurationV2 => Some(24),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown field type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field type '{0}'")]
pub struct UnknownFieldTypeError(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFieldTypeError(s.to_string()))
    }
}
