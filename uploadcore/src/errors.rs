//! Error types for the upload engine.
//!
//! Canonicalization and compatibility checks return verdict values, not
//! errors. The types here are used by the orchestration helpers that act on
//! those verdicts: schema revision acceptance, budget enforcement, field
//! definition validation, attachment hand-off and configuration loading.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::fields::FieldSize;

/// The main error type for upload engine operations.
#[derive(Debug, Error)]
pub enum UploadError {
    /// A field definition is structurally invalid.
    #[error("{0}")]
    InvalidFieldDefinition(#[from] FieldDefinitionError),

    /// A field set exceeds the table budget.
    #[error("{0}")]
    BudgetExceeded(#[from] BudgetExceededError),

    /// A schema revision would break already-ingested data.
    #[error("{0}")]
    IncompatibleRevision(#[from] IncompatibleRevisionError),

    /// The attachment uploader failed.
    #[error("Attachment upload failed for field '{field}': {message}")]
    Attachment {
        /// Field whose value was being uploaded.
        field: String,
        /// Uploader error description.
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UploadError {
    /// Creates an attachment error.
    #[must_use]
    pub fn attachment(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attachment {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Diagnostic metadata attached to rejected schema operations.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Stable error code, see [`codes`].
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Stable error codes.
pub mod codes {
    /// Field definition failed structural validation.
    pub const INVALID_FIELD: &str = "UPLOAD-001-FIELD";
    /// Schema revision contains breaking changes.
    pub const INCOMPATIBLE_REVISION: &str = "UPLOAD-002-REVISION";
    /// Field set exceeds the table budget.
    pub const BUDGET_EXCEEDED: &str = "UPLOAD-003-BUDGET";
}

/// Error raised when a field definition is structurally invalid.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid field definition '{field}': {}", .problems.join("; "))]
pub struct FieldDefinitionError {
    /// Name of the offending field.
    pub field: String,
    /// Every problem found.
    pub problems: Vec<String>,
}

impl FieldDefinitionError {
    /// Returns `Ok` when `problems` is empty, the error otherwise.
    pub fn check(field: &str, problems: Vec<String>) -> Result<(), Self> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Self {
                field: field.to_string(),
                problems,
            })
        }
    }

    /// Diagnostic metadata for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new(codes::INVALID_FIELD, self.to_string())
            .with_context_entry("field", self.field.clone())
    }
}

/// Error raised when a field set exceeds the table budget.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "Fields need {} bytes in {} columns, limit is {max_bytes} bytes in {max_columns} columns",
    .size.num_bytes,
    .size.num_columns
)]
pub struct BudgetExceededError {
    /// Computed size of the field set.
    pub size: FieldSize,
    /// Configured byte ceiling.
    pub max_bytes: usize,
    /// Configured column ceiling.
    pub max_columns: usize,
}

impl BudgetExceededError {
    /// Diagnostic metadata for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new(codes::BUDGET_EXCEEDED, self.to_string())
            .with_fix_hint("Split the fields across schemas or shrink string maxLength values")
    }
}

/// Error raised when a schema revision is rejected.
#[derive(Debug, Clone, Error)]
#[error("Incompatible schema revision: {}", .breaking_changes.join("; "))]
pub struct IncompatibleRevisionError {
    /// Every breaking change found.
    pub breaking_changes: Vec<String>,
    /// Diagnostic metadata.
    pub error_info: ErrorInfo,
}

impl IncompatibleRevisionError {
    /// Creates the error from a list of breaking changes.
    #[must_use]
    pub fn new(breaking_changes: Vec<String>) -> Self {
        let error_info = ErrorInfo::new(
            codes::INCOMPATIBLE_REVISION,
            format!("{} breaking change(s) in schema revision", breaking_changes.len()),
        )
        .with_fix_hint("Publish a new schema, or add a new field instead of changing this one");
        Self {
            breaking_changes,
            error_info,
        }
    }
}
