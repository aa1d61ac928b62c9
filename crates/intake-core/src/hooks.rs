//! Collaborator traits
//!
//! The intake workflow does not own configuration storage, the entity-type
//! catalog or entity persistence. The host application implements these traits
//! and hands them to the workflow.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{DraftEntity, ExtensionRule, MimeMapping, WidgetConfig};

/// Read access to the classification configuration.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Load every MIME mapping record
    async fn load_mime_mappings(&self) -> Result<Vec<MimeMapping>, String>;

    /// Load the extension rules of the types a widget selects, in selection order
    async fn load_extension_rules(&self, widget: &WidgetConfig)
        -> Result<Vec<ExtensionRule>, String>;
}

/// Knowledge about target types.
#[async_trait]
pub trait EntityTypeCatalog: Send + Sync {
    /// Name of the attribute that carries the uploaded file, if the type declares one
    async fn content_attribute_of(&self, target_type: &str) -> Option<String>;
}

/// Entity persistence used when a session is committed.
#[async_trait]
pub trait DraftPersistence: Send + Sync {
    /// Persist one draft. The error string is shown to the user as the reason.
    async fn commit(&self, draft: &DraftEntity) -> Result<(), String>;

    /// Allocate an identifier for a new draft
    fn create_draft_id(&self) -> Uuid;
}
