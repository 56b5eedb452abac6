//! Storage budget of field definitions in the downstream fixed-width table.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use super::definition::FieldDefinition;
use super::types::{
    FieldType, BYTES_PER_CHARACTER, DEFAULT_MAX_LENGTH, MULTI_CHOICE_ANSWER_BYTES,
    UNBOUNDED_TEXT_BYTES,
};

/// Bytes and columns a field (or set of fields) occupies in a table row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSize {
    /// Number of bytes.
    pub num_bytes: usize,
    /// Number of table columns.
    pub num_columns: usize,
}

impl FieldSize {
    /// The empty size.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new size.
    #[must_use]
    pub const fn new(num_bytes: usize, num_columns: usize) -> Self {
        Self {
            num_bytes,
            num_columns,
        }
    }
}

/// Saturates at `usize::MAX` instead of overflowing.
impl Add for FieldSize {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.num_bytes.saturating_add(rhs.num_bytes),
            self.num_columns.saturating_add(rhs.num_columns),
        )
    }
}

impl AddAssign for FieldSize {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for FieldSize {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a FieldSize> for FieldSize {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Computes the combined storage budget of a list of field definitions.
///
/// Fields without a type contribute nothing.
#[must_use]
pub fn calculate_field_size(fields: &[FieldDefinition]) -> FieldSize {
    fields.iter().map(FieldDefinition::size).sum()
}

impl FieldDefinition {
    /// Storage budget of this single field.
    #[must_use]
    pub fn size(&self) -> FieldSize {
        let Some(field_type) = self.field_type else {
            return FieldSize::ZERO;
        };

        if let Some(fixed) = field_type.fixed_size() {
            return fixed;
        }

        match field_type {
            FieldType::MultiChoice => {
                let num_choices = self.multi_choice_answer_list.as_ref().map_or(0, Vec::len);
                let mut size = FieldSize::new(
                    num_choices.saturating_mul(MULTI_CHOICE_ANSWER_BYTES),
                    num_choices,
                );
                if self.allows_other_choices() {
                    size += FieldSize::new(UNBOUNDED_TEXT_BYTES, 1);
                }
                size
            }
            _ if self.is_unbounded_text() => FieldSize::new(UNBOUNDED_TEXT_BYTES, 1),
            _ => FieldSize::new(
                BYTES_PER_CHARACTER.saturating_mul(self.effective_max_length()),
                1,
            ),
        }
    }

    /// Declared `maxLength`, or the default width when unset.
    #[must_use]
    pub fn effective_max_length(&self) -> usize {
        self.max_length.unwrap_or(DEFAULT_MAX_LENGTH)
    }
}
