//! Whole-schema revision checks.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::field::field_incompatibilities;
use crate::errors::IncompatibleRevisionError;
use crate::fields::FieldDefinition;

/// Result of comparing two revisions of a schema's field list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRevisionReport {
    /// Changes that would break already-ingested data.
    pub breaking_changes: Vec<String>,
    /// Fields present in the old revision whose definition changed compatibly.
    pub changed_fields: Vec<String>,
    /// Fields that only exist in the new revision.
    pub added_fields: Vec<String>,
}

impl SchemaRevisionReport {
    /// True when no breaking changes were detected.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.breaking_changes.is_empty()
    }

    /// Human readable summary string.
    #[must_use]
    pub fn summary(&self) -> String {
        let status = if self.is_compatible() {
            "compatible"
        } else {
            "breaking"
        };
        format!(
            "Schema revision: {} (breaking={}, changed={}, added={})",
            status,
            self.breaking_changes.len(),
            self.changed_fields.len(),
            self.added_fields.len()
        )
    }

    /// Returns the report if compatible, or an error naming every breaking change.
    pub fn into_result(self) -> Result<Self, IncompatibleRevisionError> {
        if self.is_compatible() {
            Ok(self)
        } else {
            Err(IncompatibleRevisionError::new(self.breaking_changes))
        }
    }
}

/// Compares an old and a new field list by name.
///
/// Removing a field is breaking, as is any change [`field_incompatibilities`]
/// reports for a surviving field. A name declared twice in the new revision is
/// also breaking. New fields are listed in `added_fields`.
#[must_use]
pub fn check_schema_revision(old: &[FieldDefinition], new: &[FieldDefinition]) -> SchemaRevisionReport {
    let mut report = SchemaRevisionReport::default();

    let mut new_by_name: HashMap<&str, &FieldDefinition> = HashMap::with_capacity(new.len());
    for field in new {
        if new_by_name.insert(field.name.as_str(), field).is_some() {
            report
                .breaking_changes
                .push(format!("Field '{}' declared more than once", field.name));
        }
    }

    for old_field in old {
        let Some(new_field) = new_by_name.get(old_field.name.as_str()) else {
            report
                .breaking_changes
                .push(format!("Field '{}' removed", old_field.name));
            continue;
        };

        let problems = field_incompatibilities(old_field, new_field);
        if problems.is_empty() {
            if old_field != *new_field {
                report.changed_fields.push(old_field.name.clone());
            }
        } else {
            report.breaking_changes.extend(
                problems
                    .into_iter()
                    .map(|problem| format!("Field '{}': {problem}", old_field.name)),
            );
        }
    }

    let old_names: HashSet<&str> = old.iter().map(|f| f.name.as_str()).collect();
    let mut seen = HashSet::new();
    for field in new {
        let name = field.name.as_str();
        if !old_names.contains(name) && seen.insert(name) {
            report.added_fields.push(field.name.clone());
        }
    }

    if !report.is_compatible() {
        warn!(
            old_fields = old.len(),
            new_fields = new.len(),
            breaking = report.breaking_changes.len(),
            "Schema revision has breaking changes"
        );
    }

    report
}
