//! In-memory collaborators
//!
//! These implementations back the tests and the command-line tool without a
//! configuration database or an entity store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use intake_core::models::ensure_unique_id;
use intake_core::{
    ConfigurationStore, DraftEntity, DraftId, DraftPersistence, EntityTypeCatalog, ExtensionRule,
    IntakeResult, MimeMapping, MimeMappingForm, WidgetConfig,
};
use uuid::Uuid;

/// Configuration store holding mappings and extension rules in memory.
#[derive(Debug, Default)]
pub struct InMemoryConfigurationStore {
    mappings: RwLock<Vec<MimeMapping>>,
    extension_rules: RwLock<Vec<ExtensionRule>>,
    unavailable: RwLock<Option<String>>,
}

impl InMemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(self, mapping: MimeMapping) -> Self {
        self.mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mapping);
        self
    }

    pub fn with_extension_rule(self, rule: ExtensionRule) -> Self {
        self.extension_rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(rule);
        self
    }

    /// Save a mapping the way the admin form does: validate, reject id
    /// collisions, then replace the edited record or append a new one.
    pub fn save_mapping(
        &self,
        form: MimeMappingForm,
        original_id: Option<&str>,
    ) -> IntakeResult<MimeMapping> {
        let mut mappings = self
            .mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        ensure_unique_id(&mappings, original_id, &form.id)?;
        let mapping = form.into_mapping()?;

        match original_id.and_then(|id| mappings.iter().position(|m| m.id == id)) {
            Some(index) => mappings[index] = mapping.clone(),
            None => mappings.push(mapping.clone()),
        }
        Ok(mapping)
    }

    pub fn delete_mapping(&self, id: &str) -> bool {
        let mut mappings = self
            .mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = mappings.len();
        mappings.retain(|m| m.id != id);
        mappings.len() != before
    }

    /// Make every load fail with `reason` until reset with `None`.
    pub fn set_unavailable(&self, reason: Option<String>) {
        *self
            .unavailable
            .write()
            .unwrap_or_else(PoisonError::into_inner) = reason;
    }

    fn check_available(&self) -> Result<(), String> {
        match self
            .unavailable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryConfigurationStore {
    async fn load_mime_mappings(&self) -> Result<Vec<MimeMapping>, String> {
        self.check_available()?;
        Ok(self
            .mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn load_extension_rules(
        &self,
        widget: &WidgetConfig,
    ) -> Result<Vec<ExtensionRule>, String> {
        self.check_available()?;
        let rules = self
            .extension_rules
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        if widget.media_types.is_empty() {
            return Ok(rules.clone());
        }
        Ok(widget
            .media_types
            .iter()
            .filter_map(|target_type| rules.iter().find(|r| &r.target_type == target_type))
            .cloned()
            .collect())
    }
}

/// Catalog backed by a fixed target type → content attribute table.
#[derive(Debug, Clone, Default)]
pub struct StaticEntityTypeCatalog {
    attributes: HashMap<String, String>,
}

impl StaticEntityTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(
        mut self,
        target_type: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        self.attributes.insert(target_type.into(), attribute.into());
        self
    }
}

impl FromIterator<(String, String)> for StaticEntityTypeCatalog {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl EntityTypeCatalog for StaticEntityTypeCatalog {
    async fn content_attribute_of(&self, target_type: &str) -> Option<String> {
        self.attributes.get(target_type).cloned()
    }
}

/// Persistence that records commits and fails on request.
#[derive(Default)]
pub struct RecordingPersistence {
    committed: Mutex<Vec<DraftEntity>>,
    attempts: Mutex<Vec<DraftId>>,
    /// Source file name → failure reason
    failures: Mutex<HashMap<String, String>>,
    queued_ids: Mutex<VecDeque<Uuid>>,
}

impl RecordingPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every commit of a draft built from the file named `file_name`.
    pub fn fail_file(&self, file_name: impl Into<String>, reason: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file_name.into(), reason.into());
    }

    pub fn clear_failures(&self) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Hand out these ids before falling back to random ones.
    pub fn queue_ids(&self, ids: impl IntoIterator<Item = Uuid>) {
        self.queued_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(ids);
    }

    pub fn committed(&self) -> Vec<DraftEntity> {
        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every commit attempt, successful or not, in call order.
    pub fn attempts(&self) -> Vec<DraftId> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn attempts_for(&self, uuid: DraftId) -> usize {
        self.attempts().iter().filter(|id| **id == uuid).count()
    }
}

#[async_trait]
impl DraftPersistence for RecordingPersistence {
    async fn commit(&self, draft: &DraftEntity) -> Result<(), String> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(draft.uuid);

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&draft.source_file.name)
            .cloned();
        if let Some(reason) = failure {
            return Err(reason);
        }

        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(draft.clone());
        Ok(())
    }

    fn create_draft_id(&self) -> Uuid {
        self.queued_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(Uuid::new_v4)
    }
}
