//! Draft construction for classified files.

use std::collections::BTreeMap;
use std::sync::Arc;

use intake_core::{
    DraftEntity, DraftId, DraftPersistence, EntityTypeCatalog, IntakeError, IntakeResult,
    UploadedFile,
};

/// Build a draft of `target_type` with `file` attached to its content attribute.
///
/// Never persists anything. A target type without a content attribute is a
/// configuration defect and fails with [`IntakeError::UnresolvedAttribute`].
pub fn materialize(
    file: UploadedFile,
    target_type: &str,
    content_attribute: Option<String>,
    uuid: DraftId,
) -> IntakeResult<DraftEntity> {
    let attribute_name = content_attribute
        .filter(|name| !name.is_empty())
        .ok_or_else(|| IntakeError::UnresolvedAttribute {
            target_type: target_type.to_string(),
        })?;

    Ok(DraftEntity {
        uuid,
        target_type: target_type.to_string(),
        attribute_name,
        source_file: file,
        field_values: BTreeMap::new(),
    })
}

/// Resolves content attributes through the catalog and draft ids through the
/// persistence collaborator.
#[derive(Clone)]
pub struct Materializer {
    catalog: Arc<dyn EntityTypeCatalog>,
    persistence: Arc<dyn DraftPersistence>,
}

impl Materializer {
    pub fn new(catalog: Arc<dyn EntityTypeCatalog>, persistence: Arc<dyn DraftPersistence>) -> Self {
        Self {
            catalog,
            persistence,
        }
    }

    pub async fn materialize(
        &self,
        file: UploadedFile,
        target_type: &str,
    ) -> IntakeResult<DraftEntity> {
        let content_attribute = self.catalog.content_attribute_of(target_type).await;
        let uuid = DraftId::from(self.persistence.create_draft_id());

        let draft = materialize(file, target_type, content_attribute, uuid)?;
        tracing::debug!(
            draft_id = %draft.uuid,
            target_type = %draft.target_type,
            attribute = %draft.attribute_name,
            file = %draft.source_file.name,
            "Materialized draft entity"
        );
        Ok(draft)
    }
}
