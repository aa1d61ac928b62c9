use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Extensions a single target type accepts, configured per upload widget.
///
/// Extensions are stored lowercase and without a leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRule {
    pub target_type: String,
    pub extensions: BTreeSet<String>,
}

impl ExtensionRule {
    pub fn new<I, S>(target_type: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            target_type: target_type.into(),
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Parse the space-separated extension setting of a content field
    /// (e.g. `"jpg jpeg png"`).
    pub fn parse(target_type: impl Into<String>, setting: &str) -> Self {
        Self::new(target_type, setting.split_whitespace())
    }

    /// Case-insensitive test; an empty extension never matches.
    pub fn accepts(&self, extension: &str) -> bool {
        if extension.is_empty() {
            return false;
        }
        self.extensions.contains(&extension.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setting() {
        let rule = ExtensionRule::parse("image", "jpg  PNG .gif\tjpeg");
        assert_eq!(rule.target_type, "image");
        let exts: Vec<&str> = rule.extensions.iter().map(String::as_str).collect();
        assert_eq!(exts, vec!["gif", "jpeg", "jpg", "png"]);
    }

    #[test]
    fn test_accepts_case_insensitive() {
        let rule = ExtensionRule::new("document", ["pdf", "DOCX"]);
        assert!(rule.accepts("pdf"));
        assert!(rule.accepts("PDF"));
        assert!(rule.accepts("docx"));
        assert!(!rule.accepts("txt"));
    }

    #[test]
    fn test_empty_extension_never_matches() {
        let rule = ExtensionRule::new("misc", ["", "."]);
        assert!(rule.is_empty());
        assert!(!rule.accepts(""));
    }
}
