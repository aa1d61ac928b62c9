//! Support code for the `intake` command-line tool.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use intake_core::{ExtensionRule, FileReference, MimeMappingForm, UploadedFile};
use intake_processing::memory::{InMemoryConfigurationStore, StaticEntityTypeCatalog};
use serde::{Deserialize, Serialize};

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingEntry {
    pub id: String,
    pub mime_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionEntry {
    pub target_type: String,
    /// Space-separated, as typed into the field settings
    pub extensions: String,
}

/// JSON rule file standing in for the site configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub mime_mappings: Vec<MappingEntry>,
    #[serde(default)]
    pub extension_rules: Vec<ExtensionEntry>,
    /// Target type → attribute that carries the uploaded file
    #[serde(default)]
    pub content_attributes: BTreeMap<String, String>,
}

impl RuleFile {
    /// Build a configuration store, saving every mapping through the same
    /// validation the admin form applies.
    pub fn store(&self) -> anyhow::Result<InMemoryConfigurationStore> {
        let store = self
            .extension_rules
            .iter()
            .fold(InMemoryConfigurationStore::new(), |store, entry| {
                store.with_extension_rule(ExtensionRule::parse(
                    entry.target_type.clone(),
                    &entry.extensions,
                ))
            });

        for entry in &self.mime_mappings {
            let form = MimeMappingForm {
                id: entry.id.trim().to_string(),
                mime_types: entry
                    .mime_types
                    .iter()
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect(),
            };
            store
                .save_mapping(form, None)
                .with_context(|| format!("Invalid mime mapping '{}'", entry.id))?;
        }
        Ok(store)
    }

    pub fn catalog(&self) -> StaticEntityTypeCatalog {
        self.content_attributes
            .iter()
            .map(|(target_type, attribute)| (target_type.clone(), attribute.clone()))
            .collect()
    }
}

pub fn load_rule_file(path: &Path) -> anyhow::Result<RuleFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse rule file {}", path.display()))
}

/// Parse a `NAME[:MIME]` argument into an uploaded file.
///
/// Only the name is used; nothing is read from disk.
pub fn parse_file_arg(arg: &str) -> anyhow::Result<UploadedFile> {
    let (name, mime_type) = match arg.split_once(':') {
        Some((name, mime_type)) => (name.trim(), mime_type.trim()),
        None => (arg.trim(), ""),
    };
    if name.is_empty() {
        anyhow::bail!("File argument '{}' has no name", arg);
    }
    Ok(UploadedFile::new(
        name,
        mime_type,
        FileReference::new(format!("temporary://{}", name)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::{ConfigurationStore, EntityTypeCatalog, WidgetConfig};
    use std::io::Write;

    const RULES: &str = r#"{
        "mime_mappings": [
            { "id": "image", "mime_types": ["image/png", " image/jpeg "] },
            { "id": "document", "mime_types": ["application/pdf"] }
        ],
        "extension_rules": [
            { "target_type": "image", "extensions": "png jpg" }
        ],
        "content_attributes": { "image": "field_media_image" }
    }"#;

    #[test]
    fn parse_file_arg_with_mime() {
        let file = parse_file_arg("photo.png:image/png; charset=binary").unwrap();
        assert_eq!(file.name, "photo.png");
        assert_eq!(file.normalized_mime_type(), "image/png");
        assert_eq!(file.file_ref.as_str(), "temporary://photo.png");
    }

    #[test]
    fn parse_file_arg_without_mime() {
        let file = parse_file_arg("notes.txt").unwrap();
        assert_eq!(file.declared_mime_type, "");
        assert!(parse_file_arg(":image/png").is_err());
    }

    #[tokio::test]
    async fn load_rule_file_builds_collaborators() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(RULES.as_bytes()).unwrap();

        let rules = load_rule_file(tmp.path()).unwrap();
        let store = rules.store().unwrap();
        let mappings = store.load_mime_mappings().await.unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].mime_types, vec!["image/png", "image/jpeg"]);

        let extension_rules = store
            .load_extension_rules(&WidgetConfig::default())
            .await
            .unwrap();
        assert!(extension_rules[0].accepts("JPG"));

        let catalog = rules.catalog();
        assert_eq!(
            catalog.content_attribute_of("image").await.as_deref(),
            Some("field_media_image")
        );
        assert_eq!(catalog.content_attribute_of("document").await, None);
    }

    #[test]
    fn invalid_mapping_is_rejected() {
        let rules = RuleFile {
            mime_mappings: vec![MappingEntry {
                id: "image".to_string(),
                mime_types: vec!["not a mime type".to_string()],
            }],
            ..RuleFile::default()
        };
        let err = rules.store().unwrap_err();
        assert!(err.to_string().contains("image"));
    }

    #[test]
    fn missing_rule_file_reports_path() {
        let err = load_rule_file(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rules.json"));
    }
}
