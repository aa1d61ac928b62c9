use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::uploaded_file::{FileReference, UploadedFile};

/// Session-local identifier of a draft entity.
///
/// Used as the form key during editing and as the commit key afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(Uuid);

impl DraftId {
    /// Generate a new random draft ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from a string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DraftId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Debug for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DraftId({})", self.0)
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An in-memory entity built from a classified file, awaiting edits and commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntity {
    pub uuid: DraftId,
    /// Target type the file was classified as
    pub target_type: String,
    /// Attribute of the target type that carries the uploaded file
    pub attribute_name: String,
    /// The uploaded file; the draft owns it for the lifetime of the session
    pub source_file: UploadedFile,
    /// Values entered in the edit step, keyed by field name
    #[serde(default)]
    pub field_values: BTreeMap<String, JsonValue>,
}

impl DraftEntity {
    pub fn file_ref(&self) -> &FileReference {
        &self.source_file.file_ref
    }

    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.field_values.get(name)
    }

    /// Set a field value, returning the previous one.
    pub fn set_field(&mut self, name: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.field_values.insert(name.into(), value)
    }
}
