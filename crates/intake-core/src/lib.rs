//! Intake Core Library
//!
//! This crate provides the domain models, error types, configuration, validation
//! and collaborator traits shared by the intake workspace crates.

pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::IntakeConfig;
pub use error::{IntakeError, IntakeResult, LogLevel};
pub use hooks::{ConfigurationStore, DraftPersistence, EntityTypeCatalog};
pub use models::{
    ClassificationStrategy, DraftEntity, DraftId, ExtensionRule, FileReference, MimeMapping,
    MimeMappingForm, SessionPhase, SessionSnapshot, UploadedFile, WidgetConfig,
};
