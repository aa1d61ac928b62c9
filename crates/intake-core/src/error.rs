//! Error types module
//!
//! All failures of the intake workflow are unified under [`IntakeError`]. Only
//! [`IntakeError::RuleSetUnavailable`] is fatal for a whole batch; the other
//! variants describe a single file, a single draft, or a rejected operation and
//! are collected into per-item outcomes by the caller.

use crate::models::{DraftId, SessionPhase};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like rejected input
    Debug,
    /// Warning level - for recoverable issues like a misconfigured target type
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Target type '{target_type}' declares no content attribute")]
    UnresolvedAttribute { target_type: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to persist draft {uuid}: {reason}")]
    PersistenceFailure { uuid: DraftId, reason: String },

    #[error("Classification rules unavailable: {0}")]
    RuleSetUnavailable(String),

    #[error("Cannot {action} a session in phase '{phase}'")]
    InvalidTransition {
        phase: SessionPhase,
        action: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type IntakeResult<T> = Result<T, IntakeError>;

impl From<validator::ValidationErrors> for IntakeError {
    fn from(err: validator::ValidationErrors) -> Self {
        IntakeError::Validation(err.to_string())
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn intake_error_static_metadata(err: &IntakeError) -> (&'static str, bool, LogLevel) {
    match err {
        IntakeError::Configuration(_) => ("CONFIGURATION_ERROR", false, LogLevel::Warn),
        IntakeError::UnresolvedAttribute { .. } => {
            ("UNRESOLVED_ATTRIBUTE", false, LogLevel::Warn)
        }
        IntakeError::Validation(_) => ("VALIDATION_ERROR", false, LogLevel::Debug),
        IntakeError::PersistenceFailure { .. } => ("PERSISTENCE_FAILURE", true, LogLevel::Error),
        IntakeError::RuleSetUnavailable(_) => ("RULE_SET_UNAVAILABLE", true, LogLevel::Error),
        IntakeError::InvalidTransition { .. } => ("INVALID_TRANSITION", false, LogLevel::Debug),
        IntakeError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        IntakeError::Serialization(_) => ("SERIALIZATION_ERROR", false, LogLevel::Warn),
    }
}

impl IntakeError {
    /// Machine-readable error code (e.g., "PERSISTENCE_FAILURE")
    pub fn error_code(&self) -> &'static str {
        intake_error_static_metadata(self).0
    }

    /// Whether retrying the same operation may succeed
    pub fn is_recoverable(&self) -> bool {
        intake_error_static_metadata(self).1
    }

    pub fn log_level(&self) -> LogLevel {
        intake_error_static_metadata(self).2
    }

    /// True for the errors that abort a whole batch instead of a single item.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(self, IntakeError::RuleSetUnavailable(_))
    }
}
