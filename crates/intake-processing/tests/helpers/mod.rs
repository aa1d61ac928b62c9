#![allow(dead_code)]

use std::sync::Arc;

use intake_core::{ExtensionRule, FileReference, MimeMapping, UploadedFile};
use intake_processing::memory::{
    InMemoryConfigurationStore, RecordingPersistence, StaticEntityTypeCatalog,
};
use intake_processing::{ClassificationMode, IntakeContext, RuleSet, UploadSession};

/// Collaborators of one test widget
pub struct TestIntake {
    pub store: Arc<InMemoryConfigurationStore>,
    pub catalog: Arc<StaticEntityTypeCatalog>,
    pub persistence: Arc<RecordingPersistence>,
    pub context: Arc<IntakeContext>,
}

impl TestIntake {
    pub fn session(&self) -> UploadSession {
        UploadSession::new(Arc::clone(&self.context))
    }
}

pub fn catalog() -> StaticEntityTypeCatalog {
    StaticEntityTypeCatalog::new()
        .with_attribute("image", "field_media_image")
        .with_attribute("document", "field_media_document")
        .with_attribute("audio", "field_media_audio_file")
}

pub fn store() -> InMemoryConfigurationStore {
    InMemoryConfigurationStore::new()
        .with_mapping(MimeMapping::new("image", ["image/png", "image/jpeg"]))
        .with_mapping(MimeMapping::new("document", ["application/pdf"]))
        .with_extension_rule(ExtensionRule::parse("image", "png jpg jpeg gif"))
        .with_extension_rule(ExtensionRule::parse("document", "pdf txt"))
}

/// Widget classifying by MIME mapping with rules read from the store per batch.
pub fn setup_mime_intake() -> TestIntake {
    let store = Arc::new(store());
    let catalog = Arc::new(catalog());
    let persistence = Arc::new(RecordingPersistence::new());
    let context = Arc::new(IntakeContext::from_store(
        store.clone(),
        intake_core::WidgetConfig::default(),
        catalog.clone(),
        persistence.clone(),
    ));
    TestIntake {
        store,
        catalog,
        persistence,
        context,
    }
}

/// Widget with fixed rules and an explicit mode.
pub fn setup_intake_with(rules: RuleSet, mode: ClassificationMode) -> TestIntake {
    let catalog = Arc::new(catalog());
    let persistence = Arc::new(RecordingPersistence::new());
    let context = Arc::new(IntakeContext::new(
        Arc::new(rules),
        mode,
        catalog.clone(),
        persistence.clone(),
    ));
    TestIntake {
        store: Arc::new(store()),
        catalog,
        persistence,
        context,
    }
}

pub fn upload(name: &str, mime_type: &str) -> UploadedFile {
    UploadedFile::new(
        name,
        mime_type,
        FileReference::new(format!("temporary://{}", name)),
    )
}
