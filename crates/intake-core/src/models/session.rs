use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::draft::{DraftEntity, DraftId};
use crate::error::IntakeResult;

/// Upload session phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Waiting for a batch of files.
    Collecting,
    /// Drafts exist and are being reviewed.
    Editing,
    /// Every draft was persisted.
    Committed,
    /// The user abandoned the session.
    Cancelled,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Editing => "editing",
            Self::Committed => "committed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Check if the session reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Cancelled)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable state of an upload session.
///
/// This is what the transport layer keeps between requests; restoring it
/// reproduces the phase and the ordered drafts exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub phase: SessionPhase,
    pub drafts: Vec<DraftEntity>,
    /// Drafts persisted by an earlier, partially failed commit
    #[serde(default)]
    pub committed: Vec<DraftId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> IntakeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> IntakeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
