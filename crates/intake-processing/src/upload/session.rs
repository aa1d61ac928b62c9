//! Upload session state machine
//!
//! ```text
//! Collecting --submit_batch (drafts)--> Editing --commit (all ok)--> Committed
//!     |                                  |  ^
//!     |                                  |  | commit (some failed)
//!     |                                  +--+
//!     +--------------cancel--------------+-----------------------> Cancelled
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use intake_core::{
    DraftEntity, DraftId, IntakeError, IntakeResult, SessionPhase, SessionSnapshot, UploadedFile,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::context::{FileOutcome, IntakeContext};
use super::trace_error;
use super::types::{BatchReport, CommitReport, CommitStatus, DraftCommitOutcome, FileFailure};

/// One user's upload → edit → commit round trip.
///
/// Drafts are kept in upload order. Only the state returned by
/// [`UploadSession::snapshot`] needs to survive between requests.
pub struct UploadSession {
    id: Uuid,
    phase: SessionPhase,
    drafts: Vec<DraftEntity>,
    committed: Vec<DraftId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    context: Arc<IntakeContext>,
}

impl UploadSession {
    pub fn new(context: Arc<IntakeContext>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Collecting,
            drafts: Vec::new(),
            committed: Vec::new(),
            created_at: now,
            updated_at: now,
            context,
        }
    }

    /// Rebuild a session from a snapshot taken by [`UploadSession::snapshot`].
    pub fn restore(snapshot: SessionSnapshot, context: Arc<IntakeContext>) -> IntakeResult<Self> {
        let expects_drafts = snapshot.phase == SessionPhase::Editing;
        if expects_drafts == snapshot.drafts.is_empty() {
            return Err(IntakeError::InvalidInput(format!(
                "Session in phase '{}' cannot hold {} drafts",
                snapshot.phase,
                snapshot.drafts.len()
            )));
        }

        let mut seen = HashSet::new();
        let ids = snapshot
            .drafts
            .iter()
            .map(|d| d.uuid)
            .chain(snapshot.committed.iter().copied());
        for uuid in ids {
            if !seen.insert(uuid) {
                return Err(IntakeError::InvalidInput(format!(
                    "Draft id {} appears more than once",
                    uuid
                )));
            }
        }

        Ok(Self {
            id: snapshot.id,
            phase: snapshot.phase,
            drafts: snapshot.drafts,
            committed: snapshot.committed,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            context,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            phase: self.phase,
            drafts: self.drafts.clone(),
            committed: self.committed.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn drafts(&self) -> &[DraftEntity] {
        &self.drafts
    }

    /// Drafts persisted by earlier commits of this session.
    pub fn committed_ids(&self) -> &[DraftId] {
        &self.committed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn context(&self) -> &Arc<IntakeContext> {
        &self.context
    }

    pub fn draft(&self, uuid: DraftId) -> Option<&DraftEntity> {
        self.drafts.iter().find(|d| d.uuid == uuid)
    }

    /// Mutable access for the edit step.
    pub fn draft_mut(&mut self, uuid: DraftId) -> IntakeResult<&mut DraftEntity> {
        self.require_phase(SessionPhase::Editing, "edit drafts of")?;
        self.updated_at = Utc::now();
        self.drafts
            .iter_mut()
            .find(|d| d.uuid == uuid)
            .ok_or_else(|| IntakeError::InvalidInput(format!("Unknown draft {}", uuid)))
    }

    /// Set one field of a draft, returning the previous value.
    pub fn set_field(
        &mut self,
        uuid: DraftId,
        name: impl Into<String>,
        value: JsonValue,
    ) -> IntakeResult<Option<JsonValue>> {
        Ok(self.draft_mut(uuid)?.set_field(name, value))
    }

    /// Classify and materialize a batch of uploaded files.
    ///
    /// Files are processed concurrently; drafts are appended in upload order.
    /// Unmatched and unmaterializable files are reported, not raised. Only a
    /// failure to load the rules aborts the batch, leaving the session as it was.
    pub async fn submit_batch(&mut self, files: Vec<UploadedFile>) -> IntakeResult<BatchReport> {
        if self.phase.is_terminal() {
            return Err(self.invalid_transition("submit files to"));
        }
        let max_batch_size = self.context.max_batch_size();
        if files.len() > max_batch_size {
            return Err(IntakeError::InvalidInput(format!(
                "Batch of {} files exceeds the limit of {}",
                files.len(),
                max_batch_size
            )));
        }

        let context = Arc::clone(&self.context);
        let rules = context.rule_set().await.map_err(|err| {
            trace_error(&err, "Aborting batch");
            err
        })?;

        let mut report = BatchReport::new(files.len());
        let outcomes = join_all(
            files
                .into_iter()
                .map(|file| context.process_file(&rules, file)),
        )
        .await;

        for outcome in outcomes {
            match outcome {
                FileOutcome::Drafted(draft) => {
                    if self.knows_draft(draft.uuid) {
                        let err =
                            IntakeError::InvalidInput(format!("Duplicate draft id {}", draft.uuid));
                        trace_error(&err, "Skipping file with a reused draft id");
                        report.failed.push(FileFailure {
                            file_name: draft.source_file.name,
                            target_type: draft.target_type,
                            error_code: err.error_code().to_string(),
                            reason: err.to_string(),
                        });
                        continue;
                    }
                    self.drafts.push(draft);
                    report.materialized += 1;
                }
                FileOutcome::Unmatched(name) => report.unmatched.push(name),
                FileOutcome::Failed(failure) => report.failed.push(failure),
            }
        }

        if !self.drafts.is_empty() {
            self.phase = SessionPhase::Editing;
        }
        self.updated_at = Utc::now();

        tracing::info!(
            session_id = %self.id,
            submitted = report.submitted,
            materialized = report.materialized,
            unmatched = report.unmatched_count(),
            failed = report.failed.len(),
            phase = %self.phase,
            "Processed upload batch"
        );
        if let Some(message) = report.unmatched_message() {
            tracing::warn!(session_id = %self.id, "{}", message);
        }

        Ok(report)
    }

    /// Persist every pending draft in insertion order.
    ///
    /// A failed draft does not stop the others and nothing is rolled back.
    /// Persisted drafts leave the session; failed ones stay for another
    /// attempt, which only retries them.
    pub async fn commit(&mut self) -> IntakeResult<CommitReport> {
        self.require_phase(SessionPhase::Editing, "commit")?;

        let persistence = self.context.persistence();
        let mut outcomes = Vec::with_capacity(self.drafts.len());
        for draft in &self.drafts {
            let outcome = match persistence.commit(draft).await {
                Ok(()) => {
                    tracing::debug!(
                        session_id = %self.id,
                        draft_id = %draft.uuid,
                        target_type = %draft.target_type,
                        "Committed draft"
                    );
                    CommitStatus::Success
                }
                Err(reason) => {
                    let err = IntakeError::PersistenceFailure {
                        uuid: draft.uuid,
                        reason: reason.clone(),
                    };
                    trace_error(&err, "Draft commit failed");
                    CommitStatus::Failed { reason }
                }
            };
            outcomes.push(DraftCommitOutcome {
                uuid: draft.uuid,
                outcome,
            });
        }

        let succeeded: Vec<DraftId> = outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.uuid)
            .collect();
        self.drafts.retain(|d| !succeeded.contains(&d.uuid));
        self.committed.extend(succeeded);

        if self.drafts.is_empty() {
            self.phase = SessionPhase::Committed;
        }
        self.updated_at = Utc::now();

        let report = CommitReport {
            outcomes,
            phase: self.phase,
        };
        tracing::info!(
            session_id = %self.id,
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            phase = %self.phase,
            "Committed upload session"
        );
        Ok(report)
    }

    /// Discard all pending drafts. Returns how many were dropped.
    ///
    /// Drafts already persisted by a partial commit stay persisted.
    pub fn cancel(&mut self) -> IntakeResult<usize> {
        if self.phase.is_terminal() {
            return Err(self.invalid_transition("cancel"));
        }

        let discarded = self.drafts.len();
        self.drafts.clear();
        self.phase = SessionPhase::Cancelled;
        self.updated_at = Utc::now();

        tracing::info!(
            session_id = %self.id,
            discarded,
            already_committed = self.committed.len(),
            "Cancelled upload session"
        );
        Ok(discarded)
    }

    fn knows_draft(&self, uuid: DraftId) -> bool {
        self.drafts.iter().any(|d| d.uuid == uuid) || self.committed.contains(&uuid)
    }

    fn require_phase(&self, phase: SessionPhase, action: &'static str) -> IntakeResult<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.invalid_transition(action))
        }
    }

    fn invalid_transition(&self, action: &'static str) -> IntakeError {
        IntakeError::InvalidTransition {
            phase: self.phase,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassificationMode;
    use crate::memory::{RecordingPersistence, StaticEntityTypeCatalog};
    use crate::rules::RuleSet;
    use intake_core::{FileReference, MimeMapping};

    fn context() -> Arc<IntakeContext> {
        let rules = RuleSet::builder()
            .mime_mapping(MimeMapping::new("image", ["image/png"]))
            .build();
        let catalog = StaticEntityTypeCatalog::new().with_attribute("image", "field_media_image");
        Arc::new(IntakeContext::new(
            Arc::new(rules),
            ClassificationMode::ByMimeMapping { priority: vec![] },
            Arc::new(catalog),
            Arc::new(RecordingPersistence::new()),
        ))
    }

    fn png(name: &str) -> UploadedFile {
        UploadedFile::new(name, "image/png", FileReference::new(format!("temporary://{}", name)))
    }

    #[tokio::test]
    async fn test_new_session_is_collecting() {
        let session = UploadSession::new(context());
        assert_eq!(session.phase(), SessionPhase::Collecting);
        assert!(session.drafts().is_empty());
        assert_eq!(session.created_at(), session.updated_at());
    }

    #[tokio::test]
    async fn test_commit_while_collecting_is_rejected() {
        let mut session = UploadSession::new(context());
        let err = session.commit().await.unwrap_err();
        assert!(matches!(
            err,
            IntakeError::InvalidTransition {
                phase: SessionPhase::Collecting,
                action: "commit"
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_stays_collecting() {
        let mut session = UploadSession::new(context());
        let report = session.submit_batch(vec![]).await.unwrap();
        assert_eq!(report.materialized, 0);
        assert_eq!(session.phase(), SessionPhase::Collecting);
    }

    #[tokio::test]
    async fn test_set_field_requires_known_draft() {
        let mut session = UploadSession::new(context());
        assert!(session
            .set_field(DraftId::new(), "name", JsonValue::from("x"))
            .is_err());

        session.submit_batch(vec![png("a.png")]).await.unwrap();
        let uuid = session.drafts()[0].uuid;
        assert_eq!(
            session
                .set_field(uuid, "name", JsonValue::from("Cat"))
                .unwrap(),
            None
        );
        assert_eq!(
            session.draft(uuid).unwrap().field("name"),
            Some(&JsonValue::from("Cat"))
        );

        let err = session
            .set_field(DraftId::new(), "name", JsonValue::from("x"))
            .unwrap_err();
        assert!(matches!(err, IntakeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_restore_rejects_inconsistent_snapshot() {
        let mut session = UploadSession::new(context());
        session.submit_batch(vec![png("a.png")]).await.unwrap();

        let mut snapshot = session.snapshot();
        snapshot.phase = SessionPhase::Collecting;
        assert!(UploadSession::restore(snapshot, context()).is_err());

        let mut snapshot = session.snapshot();
        let uuid = snapshot.drafts[0].uuid;
        snapshot.committed.push(uuid);
        assert!(UploadSession::restore(snapshot, context()).is_err());

        let mut snapshot = session.snapshot();
        snapshot.drafts.clear();
        assert!(UploadSession::restore(snapshot, context()).is_err());
    }
}
