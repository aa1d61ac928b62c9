//! File classification
//!
//! Resolves zero or one target type for an uploaded file. All strategies share
//! [`classify`]; a miss is a normal [`ClassificationResult::Unmatched`], not an error.

use std::sync::Arc;

use intake_core::{ClassificationStrategy, UploadedFile, WidgetConfig};
use serde::{Deserialize, Serialize};

use crate::rules::{compare_ids, RuleSet};

/// Strategy used to pick a target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Only the given target type, matched on its extension rule.
    ByExtension { target_type: String },
    /// Every extension rule in configured order; first match wins.
    ByAnyExtension,
    /// Declared MIME type against the mapping table. An empty priority list
    /// means every mapping by ascending id.
    ByMimeMapping {
        #[serde(default)]
        priority: Vec<String>,
    },
}

impl ClassificationMode {
    /// Mode an upload widget classifies with.
    pub fn for_widget(widget: &WidgetConfig) -> Self {
        match widget.strategy {
            ClassificationStrategy::Extension => match widget.media_types.as_slice() {
                [only] => Self::ByExtension {
                    target_type: only.clone(),
                },
                _ => Self::ByAnyExtension,
            },
            ClassificationStrategy::Mime => {
                let mut priority = widget.media_types.clone();
                priority.sort_by(|a, b| compare_ids(a, b));
                Self::ByMimeMapping { priority }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "target_type", rename_all = "snake_case")]
pub enum ClassificationResult {
    Matched(String),
    Unmatched,
}

impl ClassificationResult {
    pub fn target_type(&self) -> Option<&str> {
        match self {
            Self::Matched(target_type) => Some(target_type),
            Self::Unmatched => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

impl From<Option<&str>> for ClassificationResult {
    fn from(target_type: Option<&str>) -> Self {
        match target_type {
            Some(target_type) => Self::Matched(target_type.to_string()),
            None => Self::Unmatched,
        }
    }
}

/// Classify one file against `rules` using `mode`.
pub fn classify(
    file: &UploadedFile,
    rules: &RuleSet,
    mode: &ClassificationMode,
) -> ClassificationResult {
    match mode {
        ClassificationMode::ByExtension { target_type } => {
            let Some(rule) = rules.extension_rule(target_type) else {
                tracing::debug!(
                    target_type = %target_type,
                    "No extension rule configured for target type"
                );
                return ClassificationResult::Unmatched;
            };
            if rule.accepts(&file.extension()) {
                ClassificationResult::Matched(target_type.clone())
            } else {
                ClassificationResult::Unmatched
            }
        }
        ClassificationMode::ByAnyExtension => rules.find_extension_rule(&file.extension()).into(),
        ClassificationMode::ByMimeMapping { priority } => {
            let mime_type = file.normalized_mime_type();
            if mime_type.is_empty() {
                return ClassificationResult::Unmatched;
            }
            if priority.is_empty() {
                rules.find_mime_mapping(mime_type).into()
            } else {
                rules.find_mime_mapping_in(mime_type, priority).into()
            }
        }
    }
}

/// A rule set bound to the mode one widget uses.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Arc<RuleSet>,
    mode: ClassificationMode,
}

impl Classifier {
    pub fn new(rules: Arc<RuleSet>, mode: ClassificationMode) -> Self {
        Self { rules, mode }
    }

    pub fn classify(&self, file: &UploadedFile) -> ClassificationResult {
        classify(file, &self.rules, &self.mode)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn mode(&self) -> &ClassificationMode {
        &self.mode
    }
}
