//! Field definitions, types and storage sizes.

mod definition;
mod size;
mod types;

pub use definition::FieldDefinition;
pub use size::{calculate_field_size, FieldSize};
pub use types::{
    FieldType, UnknownFieldTypeError, BYTES_PER_CHARACTER, DEFAULT_MAX_LENGTH,
    MULTI_CHOICE_ANSWER_BYTES, UNBOUNDED_TEXT_BYTES,
};
