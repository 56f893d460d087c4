/// Validation for editor-submitted content fields.
use thiserror::Error;

use super::model::EditorFields;
use super::slug;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("slug cannot be empty")]
    EmptySlug,
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidSlug,
}

/// Validate the title of a new draft.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

/// Validate an editor update before it is written.
pub fn validate_editor_fields(fields: &EditorFields) -> Result<(), ValidationError> {
    validate_title(&fields.title)?;
    if fields.slug.trim().is_empty() {
        return Err(ValidationError::EmptySlug);
    }
    if !slug::is_valid(&fields.slug) {
        return Err(ValidationError::InvalidSlug);
    }
    Ok(())
}
