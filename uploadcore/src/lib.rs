//! # Uploadcore
//!
//! Field canonicalization and schema compatibility for structured uploads.
//!
//! Every uploaded record is checked against a schema, a list of typed field
//! definitions. Uploadcore provides:
//!
//! - **Canonicalization**: coerce raw JSON values into the canonical form of
//!   their declared type, or report why they can't be
//! - **Size budgeting**: compute the storage bytes and columns a field list
//!   needs in the downstream table store
//! - **Compatibility**: decide whether a field definition may be replaced in
//!   place without breaking already-ingested data
//! - **Naming**: validate and sanitize field names and multi-choice answers
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use uploadcore::prelude::*;
//!
//! let fields = vec![
//!     FieldDefinition::new("count", FieldType::Int),
//!     FieldDefinition::new("when", FieldType::Timestamp),
//! ];
//!
//! let result = canonicalize(Some(&json!("3.14")), FieldType::Int);
//! assert_eq!(result.value(), Some(&json!(3)));
//!
//! let size = TableBudget::default().check(&fields).unwrap();
//! assert_eq!(size, FieldSize::new(55, 3));
//!
//! let widened = FieldDefinition::new("count", FieldType::Float);
//! assert!(is_compatible_field_def(&fields[0], &widened));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod attachments;
pub mod canonical;
pub mod compat;
pub mod config;
pub mod errors;
pub mod fields;
pub mod naming;
pub mod record;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::attachments::{
        attachment_reference_name, upload_attachments, AttachmentUploader,
        InMemoryAttachmentUploader,
    };
    pub use crate::canonical::{canonicalize, CanonicalizationResult};
    pub use crate::compat::{
        check_schema_revision, field_incompatibilities, is_compatible_field_def,
        SchemaRevisionReport,
    };
    pub use crate::config::TableBudget;
    pub use crate::errors::{
        BudgetExceededError, ErrorInfo, FieldDefinitionError, IncompatibleRevisionError,
        UploadError,
    };
    pub use crate::fields::{calculate_field_size, FieldDefinition, FieldSize, FieldType};
    pub use crate::naming::{
        is_valid_answer_choice, is_valid_field_name, sanitize, sanitize_field_name,
        sanitize_field_names,
    };
    pub use crate::record::{canonicalize_record, FieldError, RecordCanonicalization};
}
