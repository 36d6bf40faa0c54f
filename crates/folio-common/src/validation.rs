//! Input validation utilities.
//!
//! Form payloads go through [`validate_request`]; files go through
//! [`validate_upload`] before anything touches the network.

use validator::Validate;

use crate::error::FolioError;
use crate::models::upload::{Upload, UploadRule};

/// Validate a form body, returning a FolioError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), FolioError> {
    body.validate().map_err(|e| FolioError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect();
    // field_errors() iterates a HashMap
    messages.sort();
    messages.join("; ")
}

/// Reject blank and whitespace-only strings. Used as a `custom` validator.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Check a file against an upload rule: non-empty, within the size cap, and
/// of an accepted content type.
pub fn validate_upload(upload: &Upload, rule: &UploadRule) -> Result<(), FolioError> {
    if upload.bytes.is_empty() {
        return Err(FolioError::validation(format!(
            "File '{}' is empty",
            upload.file_name
        )));
    }

    let size = upload.bytes.len() as u64;
    if size > rule.max_bytes {
        return Err(FolioError::validation(format!(
            "File '{}' is too large: {} bytes (max {})",
            upload.file_name, size, rule.max_bytes
        )));
    }

    if !rule.accepts(&upload.content_type) {
        return Err(FolioError::validation(format!(
            "File '{}' has unsupported type '{}' ({} expected)",
            upload.file_name, upload.content_type, rule.label
        )));
    }

    Ok(())
}

/// Validate every upload in a batch, failing on the first bad file.
pub fn validate_uploads<'a>(
    uploads: impl IntoIterator<Item = &'a Upload>,
    rule: &UploadRule,
) -> Result<(), FolioError> {
    uploads.into_iter().try_for_each(|u| validate_upload(u, rule))
}
