//! Types reported by the upload workflow.

use intake_core::{DraftId, SessionPhase};
use serde::{Deserialize, Serialize};

/// A file that matched a target type but could not become a draft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file_name: String,
    pub target_type: String,
    pub error_code: String,
    pub reason: String,
}

/// Outcome of one `submit_batch` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub submitted: usize,
    pub materialized: usize,
    /// Names of files no rule matched, in upload order
    pub unmatched: Vec<String>,
    pub failed: Vec<FileFailure>,
}

impl BatchReport {
    pub fn new(submitted: usize) -> Self {
        Self {
            submitted,
            ..Self::default()
        }
    }

    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }

    /// User-facing summary of the misses, if any.
    pub fn unmatched_message(&self) -> Option<String> {
        match self.unmatched.len() {
            0 => None,
            1 => Some(format!(
                "1 of {} files could not be matched to a media type.",
                self.submitted
            )),
            n => Some(format!(
                "{} of {} files could not be matched to a media type.",
                n, self.submitted
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitStatus {
    Success,
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftCommitOutcome {
    pub uuid: DraftId,
    #[serde(flatten)]
    pub outcome: CommitStatus,
}

impl DraftCommitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CommitStatus::Success)
    }
}

/// Per-draft outcomes of one `commit` call, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub outcomes: Vec<DraftCommitOutcome>,
    /// Phase the session is in after the commit
    pub phase: SessionPhase,
}

impl CommitReport {
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(DraftCommitOutcome::is_success)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = DraftId> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.uuid)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DraftCommitOutcome> + '_ {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}
