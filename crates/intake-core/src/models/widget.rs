use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which rule kind an upload widget classifies files with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationStrategy {
    /// Match the file extension against the selected types' extension lists
    Extension,
    /// Match the declared MIME type against the mapping table
    #[default]
    Mime,
}

impl FromStr for ClassificationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "extension" | "ext" => Ok(Self::Extension),
            "mime" | "mime_mapping" => Ok(Self::Mime),
            other => Err(format!(
                "Invalid classification strategy '{}'. Must be: extension or mime",
                other
            )),
        }
    }
}

impl fmt::Display for ClassificationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension => f.write_str("extension"),
            Self::Mime => f.write_str("mime"),
        }
    }
}

/// Settings of one upload widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Storage location uploaded files are written to
    pub upload_location: String,
    /// Label of the upload-step button
    pub first_step_button_text: String,
    /// Label of the final submit button
    pub submit_text: String,
    /// Selected target types; empty selects every configured type
    pub media_types: Vec<String>,
    pub strategy: ClassificationStrategy,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            upload_location: "public://".to_string(),
            first_step_button_text: "Create media items".to_string(),
            submit_text: "Save and continue".to_string(),
            media_types: Vec::new(),
            strategy: ClassificationStrategy::default(),
        }
    }
}

impl WidgetConfig {
    pub fn selects(&self, target_type: &str) -> bool {
        self.media_types.is_empty() || self.media_types.iter().any(|t| t == target_type)
    }
}
