//! Schema evolution checks.
//!
//! [`is_compatible_field_def`] answers whether one field definition may
//! replace another in place. [`check_schema_revision`] applies it across a
//! whole field list.

mod field;
mod revision;

pub use field::{field_incompatibilities, is_compatible_field_def};
pub use revision::{check_schema_revision, SchemaRevisionReport};
