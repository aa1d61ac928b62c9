use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::normalize_mime_type;

/// Opaque reference to a file held by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference(String);

impl FileReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file handed over by the upload transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Original filename as sent by the client
    pub name: String,
    /// Client-declared MIME type; only a hint for MIME-based matching
    pub declared_mime_type: String,
    pub file_ref: FileReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        declared_mime_type: impl Into<String>,
        file_ref: FileReference,
    ) -> Self {
        Self {
            name: name.into(),
            declared_mime_type: declared_mime_type.into(),
            file_ref,
            size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Lowercased suffix after the last `.` of the base name, or `""`.
    pub fn extension(&self) -> String {
        let base = self
            .name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.name.as_str());
        match base.rsplit_once('.') {
            Some((_, extension)) => extension.to_lowercase(),
            None => String::new(),
        }
    }

    /// Declared MIME type without parameters.
    pub fn normalized_mime_type(&self) -> &str {
        normalize_mime_type(&self.declared_mime_type)
    }
}
