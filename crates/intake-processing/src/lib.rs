//! Intake Processing Library
//!
//! Classification of uploaded files against the configured rules, construction
//! of draft entities, and the two-phase upload session that holds those drafts
//! until they are committed or discarded.

pub mod classifier;
pub mod materializer;
pub mod memory;
pub mod rules;
pub mod upload;

pub use classifier::{classify, ClassificationMode, ClassificationResult, Classifier};
pub use materializer::{materialize, Materializer};
pub use rules::{compare_ids, RuleSet, RuleSetBuilder, RuleWarning};
pub use upload::{
    BatchReport, CommitReport, CommitStatus, DraftCommitOutcome, FileFailure, IntakeContext,
    UploadSession,
};
