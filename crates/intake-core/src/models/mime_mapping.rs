use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{IntakeError, IntakeResult};
use crate::validation::parse_mime_type_lines;

/// Persisted mapping from a target type to the MIME types it accepts.
///
/// `id` doubles as the target-type key the mapping produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeMapping {
    pub id: String,
    pub mime_types: Vec<String>,
}

impl MimeMapping {
    pub fn new<I, S>(id: impl Into<String>, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            mime_types: mime_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, mime_type: &str) -> bool {
        self.mime_types.iter().any(|m| m == mime_type)
    }
}

/// Admin form input for creating or editing a [`MimeMapping`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MimeMappingForm {
    /// Target type the mapping is saved under
    #[validate(length(
        min = 1,
        max = 255,
        message = "Target type must be between 1 and 255 characters"
    ))]
    pub id: String,
    /// MIME types, already split and trimmed
    #[validate(
        length(min = 1, message = "Enter one or more MIME types"),
        custom(function = "crate::validation::validate_mime_type_list")
    )]
    pub mime_types: Vec<String>,
}

impl MimeMappingForm {
    /// Build a form from the textarea format: one MIME type per line.
    pub fn from_textarea(id: impl Into<String>, text: &str) -> Self {
        Self {
            id: id.into().trim().to_string(),
            mime_types: parse_mime_type_lines(text),
        }
    }

    /// Validate the form and turn it into a mapping record.
    pub fn into_mapping(self) -> IntakeResult<MimeMapping> {
        self.validate()?;
        Ok(MimeMapping {
            id: self.id,
            mime_types: self.mime_types,
        })
    }
}

/// Reject saving a mapping under an id another record already uses.
///
/// `original_id` is the id of the record being edited, `None` when creating.
pub fn ensure_unique_id(
    existing: &[MimeMapping],
    original_id: Option<&str>,
    id: &str,
) -> IntakeResult<()> {
    if original_id == Some(id) {
        return Ok(());
    }
    if existing.iter().any(|m| m.id == id) {
        return Err(IntakeError::Validation(format!(
            "Mime mapping for '{}' already exists",
            id
        )));
    }
    Ok(())
}
