//! Outcome of canonicalizing one value.

use serde_json::Value;

/// Canonical value or validation failure for a single field value.
///
/// A valid result never carries an error message and an invalid one always
/// does. The canonical value of a valid result may be `None` when the input
/// was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalizationResult {
    value: Option<Value>,
    error_message: Option<String>,
}

impl CanonicalizationResult {
    /// Creates a valid result.
    #[must_use]
    pub const fn valid(value: Option<Value>) -> Self {
        Self {
            value,
            error_message: None,
        }
    }

    /// Creates an invalid result.
    #[must_use]
    pub fn invalid(error_message: impl Into<String>) -> Self {
        Self {
            value: None,
            error_message: Some(error_message.into()),
        }
    }

    /// True if the value was canonicalized successfully.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error_message.is_none()
    }

    /// The canonical value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Consumes the result, returning the canonical value.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    /// The validation failure message, if invalid.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Converts into a `Result`, the error being the failure message.
    pub fn into_result(self) -> Result<Option<Value>, String> {
        match self.error_message {
            None => Ok(self.value),
            Some(message) => Err(message),
        }
    }
}
