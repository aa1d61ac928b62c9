//! Two-phase upload workflow: collect → edit → commit.

mod context;
mod session;
mod types;

pub use context::IntakeContext;
pub use session::UploadSession;
pub use types::{BatchReport, CommitReport, CommitStatus, DraftCommitOutcome, FileFailure};

use intake_core::{IntakeError, LogLevel};

/// Log an error at the level its variant asks for.
pub(crate) fn trace_error(err: &IntakeError, message: &str) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error = %err, code = err.error_code(), "{}", message),
        LogLevel::Warn => tracing::warn!(error = %err, code = err.error_code(), "{}", message),
        LogLevel::Error => tracing::error!(error = %err, code = err.error_code(), "{}", message),
    }
}
