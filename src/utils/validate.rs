//! Input validation for inbound requests and output filenames.
//!
//! Everything here runs before any external call is made, so a rejected
//! request never has partial side effects.

use thiserror::Error;

use crate::models::MAX_RESULTS_LIMIT;

/// Validation error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Invalid filename: contains disallowed characters")]
    InvalidFilename,

    #[error("Path traversal detected: {0}")]
    PathTraversal(String),
}

/// Require a non-blank text field and return it trimmed
///
/// Control characters other than tab, newline and carriage return are
/// rejected, as are null bytes.
pub fn require_text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }

    if value.contains('\0') {
        return Err(ValidationError::InvalidField {
            field,
            reason: "contains null byte".to_string(),
        });
    }

    for ch in value.chars() {
        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            return Err(ValidationError::InvalidField {
                field,
                reason: "contains control characters".to_string(),
            });
        }
    }

    Ok(value.to_string())
}

/// Check a requested result count
pub fn validate_max_results(max_results: usize) -> Result<usize, ValidationError> {
    if max_results == 0 || max_results > MAX_RESULTS_LIMIT {
        return Err(ValidationError::InvalidField {
            field: "max_results",
            reason: format!("must be between 1 and {}", MAX_RESULTS_LIMIT),
        });
    }
    Ok(max_results)
}

/// Sanitize a filename to prevent path traversal and other attacks
///
/// Removes path separators and dangerous characters, limits length,
/// and ensures the filename is safe to use.
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    let filename = filename.trim();

    if filename.is_empty() {
        return Err(ValidationError::InvalidFilename);
    }

    if filename.contains("..")
        || filename.starts_with('/')
        || filename.starts_with('\\')
        || filename.contains(":/")
        || filename.contains(":\\")
    {
        return Err(ValidationError::PathTraversal(filename.to_string()));
    }

    // Keep only safe characters: alphanumeric, dash, underscore, dot, space
    let mut sanitized: String = filename
        .chars()
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | ' '))
        .collect();

    const MAX_FILENAME_LENGTH: usize = 255;
    if sanitized.chars().count() > MAX_FILENAME_LENGTH {
        let ext = sanitized
            .rfind('.')
            .map(|pos| sanitized[pos..].to_string())
            .unwrap_or_default();
        let base: String = sanitized
            .chars()
            .take(MAX_FILENAME_LENGTH.saturating_sub(ext.chars().count()))
            .collect();
        sanitized = format!("{}{}", base, ext);
    }

    if sanitized.is_empty() {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}
