//! Table budget configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{BudgetExceededError, UploadError};
use crate::fields::{calculate_field_size, FieldDefinition, FieldSize};

/// Row limits of the downstream table store.
///
/// A schema's field list must fit in one table row, so its computed
/// [`FieldSize`] is checked against these ceilings before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableBudget {
    /// Maximum row size in bytes.
    pub max_bytes: usize,
    /// Maximum number of columns.
    pub max_columns: usize,
}

impl Default for TableBudget {
    fn default() -> Self {
        Self {
            max_bytes: 64000,
            max_columns: 152,
        }
    }
}

impl TableBudget {
    /// Creates a budget with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the byte ceiling.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the column ceiling.
    #[must_use]
    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = max_columns;
        self
    }

    /// Loads a budget from JSON. Missing keys take their default.
    ///
    /// Malformed JSON is a `Serialization` error, non-positive limits a
    /// `Config` error.
    pub fn from_json_str(json: &str) -> Result<Self, UploadError> {
        let budget: Self = serde_json::from_str(json)?;
        if budget.max_bytes == 0 || budget.max_columns == 0 {
            return Err(UploadError::Config(
                "table budget limits must be positive".to_string(),
            ));
        }
        Ok(budget)
    }

    /// True if `size` fits in both ceilings.
    #[must_use]
    pub const fn fits(&self, size: FieldSize) -> bool {
        size.num_bytes <= self.max_bytes && size.num_columns <= self.max_columns
    }

    /// Computes the size of `fields` and checks it against the budget.
    pub fn check(&self, fields: &[FieldDefinition]) -> Result<FieldSize, UploadError> {
        let size = calculate_field_size(fields);
        if self.fits(size) {
            return Ok(size);
        }

        warn!(
            num_bytes = size.num_bytes,
            num_columns = size.num_columns,
            max_bytes = self.max_bytes,
            max_columns = self.max_columns,
            "Field set exceeds table budget"
        );
        Err(BudgetExceededError {
            size,
            max_bytes: self.max_bytes,
            max_columns: self.max_columns,
        }
        .into())
    }
}
