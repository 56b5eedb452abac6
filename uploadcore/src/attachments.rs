//! Hand-off of attachment-typed values to out-of-line storage.
//!
//! Attachment values are uploaded separately from the record, and the record
//! keeps only a reference name.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::errors::UploadError;
use crate::fields::FieldDefinition;

/// Storage backend for attachment values.
#[cfg_attr(test, mockall::automock)]
pub trait AttachmentUploader: Send + Sync {
    /// Stores `value` as a JSON attachment and returns its reference name.
    fn upload_json_attachment(
        &self,
        value: &Value,
        upload_id: &str,
        field_name: &str,
    ) -> Result<String, UploadError>;
}

/// Reference name of an attachment: `{upload_id}-{field_name}`.
#[must_use]
pub fn attachment_reference_name(upload_id: &str, field_name: &str) -> String {
    format!("{upload_id}-{field_name}")
}

/// Uploads every non-null attachment value and returns a copy of `values` in
/// which those values are replaced by their reference names.
///
/// Non-attachment fields and undeclared keys are copied as is. The first
/// uploader failure aborts the whole record.
pub fn upload_attachments<U>(
    fields: &[FieldDefinition],
    values: &Map<String, Value>,
    upload_id: &str,
    uploader: &U,
) -> Result<Map<String, Value>, UploadError>
where
    U: AttachmentUploader + ?Sized,
{
    let mut output = values.clone();

    for field in fields {
        if !field.field_type.is_some_and(|t| t.is_attachment()) {
            continue;
        }
        let Some(value) = values.get(&field.name).filter(|v| !v.is_null()) else {
            continue;
        };

        let reference = uploader.upload_json_attachment(value, upload_id, &field.name)?;
        debug!(
            field = %field.name,
            upload_id = %upload_id,
            reference = %reference,
            "Substituted attachment reference"
        );
        output.insert(field.name.clone(), Value::String(reference));
    }

    Ok(output)
}

/// Uploader that keeps attachments in memory, keyed by reference name.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAttachmentUploader {
    attachments: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryAttachmentUploader {
    /// Creates an empty uploader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored attachment for a reference name.
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<Value> {
        self.attachments.lock().get(reference).cloned()
    }

    /// Number of stored attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attachments.lock().len()
    }

    /// True if nothing was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attachments.lock().is_empty()
    }
}

impl AttachmentUploader for InMemoryAttachmentUploader {
    fn upload_json_attachment(
        &self,
        value: &Value,
        upload_id: &str,
        field_name: &str,
    ) -> Result<String, UploadError> {
        let reference = attachment_reference_name(upload_id, field_name);
        self.attachments.lock().insert(reference.clone(), value.clone());
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("name", FieldType::String),
            FieldDefinition::new("readings", FieldType::AttachmentJsonTable),
            FieldDefinition::new("notes", FieldType::LargeTextAttachment).with_required(false),
            FieldDefinition::new("photo", FieldType::AttachmentV2).with_required(false),
        ]
    }

    fn values(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_reference_name() {
        assert_eq!(attachment_reference_name("upload-1", "readings"), "upload-1-readings");
    }

    #[test]
    fn test_substitutes_attachment_values() {
        let uploader = InMemoryAttachmentUploader::new();
        let input = values(json!({
            "name": "sensor",
            "readings": [{ "t": 1, "v": 2.5 }],
            "notes": "a long note",
            "photo": null,
        }));

        let output = upload_attachments(&fields(), &input, "upload-1", &uploader).unwrap();

        assert_eq!(
            Value::Object(output),
            json!({
                "name": "sensor",
                "readings": "upload-1-readings",
                "notes": "upload-1-notes",
                "photo": null,
            })
        );
        assert_eq!(uploader.len(), 2);
        assert_eq!(uploader.get("upload-1-readings"), Some(json!([{ "t": 1, "v": 2.5 }])));
        assert_eq!(input.get("readings"), Some(&json!([{ "t": 1, "v": 2.5 }])));
    }

    #[test]
    fn test_calls_uploader_once_per_attachment() {
        let mut uploader = MockAttachmentUploader::new();
        uploader
            .expect_upload_json_attachment()
            .with(eq(json!({ "a": 1 })), eq("u7"), eq("readings"))
            .times(1)
            .returning(|_, upload_id, field_name| Ok(format!("s3://{upload_id}/{field_name}")));

        let input = values(json!({ "name": "x", "readings": { "a": 1 } }));
        let output = upload_attachments(&fields(), &input, "u7", &uploader).unwrap();
        assert_eq!(output.get("readings"), Some(&json!("s3://u7/readings")));
    }

    #[test]
    fn test_uploader_failure_propagates() {
        let mut uploader = MockAttachmentUploader::new();
        uploader
            .expect_upload_json_attachment()
            .returning(|_, _, field_name| Err(UploadError::attachment(field_name, "bucket unavailable")));

        let input = values(json!({ "readings": [] }));
        let err = upload_attachments(&fields(), &input, "u7", &uploader).unwrap_err();
        assert!(matches!(err, UploadError::Attachment { ref field, .. } if field == "readings"));
    }

    #[test]
    fn test_no_attachments_no_calls() {
        let mut uploader = MockAttachmentUploader::new();
        uploader.expect_upload_json_attachment().times(0);

        let input = values(json!({ "name": "x" }));
        let output = upload_attachments(&fields(), &input, "u7", &uploader).unwrap();
        assert_eq!(output, input);
    }
}
