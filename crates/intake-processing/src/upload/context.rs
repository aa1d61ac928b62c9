//! Collaborators shared by every session of one upload widget.

use std::sync::Arc;

use intake_core::{
    ConfigurationStore, DraftEntity, DraftPersistence, EntityTypeCatalog, IntakeConfig,
    IntakeResult, UploadedFile, WidgetConfig,
};

use super::trace_error;
use super::types::FileFailure;
use crate::classifier::{classify, ClassificationMode, ClassificationResult};
use crate::materializer::Materializer;
use crate::rules::RuleSet;

const DEFAULT_MAX_BATCH_SIZE: usize = 50;

enum RuleSource {
    /// Rules fixed at construction
    Loaded(Arc<RuleSet>),
    /// Rules read from the store at the start of every batch
    Store {
        store: Arc<dyn ConfigurationStore>,
        widget: WidgetConfig,
    },
}

/// What became of one file of a batch.
pub(crate) enum FileOutcome {
    Drafted(DraftEntity),
    Unmatched(String),
    Failed(FileFailure),
}

/// Rules, classification mode and collaborators a session works with.
///
/// Sessions hold this behind an `Arc`; it is not part of a session snapshot.
pub struct IntakeContext {
    rules: RuleSource,
    mode: ClassificationMode,
    materializer: Materializer,
    persistence: Arc<dyn DraftPersistence>,
    max_batch_size: usize,
}

impl IntakeContext {
    pub fn new(
        rules: Arc<RuleSet>,
        mode: ClassificationMode,
        catalog: Arc<dyn EntityTypeCatalog>,
        persistence: Arc<dyn DraftPersistence>,
    ) -> Self {
        Self {
            rules: RuleSource::Loaded(rules),
            mode,
            materializer: Materializer::new(catalog, Arc::clone(&persistence)),
            persistence,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Context that re-reads the widget's rules from `store` for every batch.
    pub fn from_store(
        store: Arc<dyn ConfigurationStore>,
        widget: WidgetConfig,
        catalog: Arc<dyn EntityTypeCatalog>,
        persistence: Arc<dyn DraftPersistence>,
    ) -> Self {
        let mode = ClassificationMode::for_widget(&widget);
        Self {
            rules: RuleSource::Store { store, widget },
            mode,
            materializer: Materializer::new(catalog, Arc::clone(&persistence)),
            persistence,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn from_config(
        config: &IntakeConfig,
        store: Arc<dyn ConfigurationStore>,
        catalog: Arc<dyn EntityTypeCatalog>,
        persistence: Arc<dyn DraftPersistence>,
    ) -> Self {
        Self::from_store(store, config.widget(), catalog, persistence)
            .with_max_batch_size(config.max_batch_size)
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn mode(&self) -> &ClassificationMode {
        &self.mode
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub(crate) fn persistence(&self) -> &dyn DraftPersistence {
        self.persistence.as_ref()
    }

    /// Rules for the next batch.
    pub async fn rule_set(&self) -> IntakeResult<Arc<RuleSet>> {
        match &self.rules {
            RuleSource::Loaded(rules) => Ok(Arc::clone(rules)),
            RuleSource::Store { store, widget } => {
                Ok(Arc::new(RuleSet::load(store.as_ref(), widget).await?))
            }
        }
    }

    /// Classify and materialize one file. Never fails the batch.
    pub(crate) async fn process_file(&self, rules: &RuleSet, file: UploadedFile) -> FileOutcome {
        let target_type = match classify(&file, rules, &self.mode) {
            ClassificationResult::Matched(target_type) => target_type,
            ClassificationResult::Unmatched => {
                tracing::debug!(
                    file = %file.name,
                    mime_type = %file.declared_mime_type,
                    "File matched no target type"
                );
                return FileOutcome::Unmatched(file.name);
            }
        };

        let file_name = file.name.clone();
        match self.materializer.materialize(file, &target_type).await {
            Ok(draft) => FileOutcome::Drafted(draft),
            Err(err) => {
                trace_error(&err, "Skipping file that could not be materialized");
                FileOutcome::Failed(FileFailure {
                    file_name,
                    target_type,
                    error_code: err.error_code().to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }
}
