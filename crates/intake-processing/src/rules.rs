//! Classification rules
//!
//! A [`RuleSet`] holds the extension rules of one widget and the MIME mapping
//! table. It is immutable once built and can be shared between any number of
//! sessions behind an `Arc`.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use intake_core::{
    ConfigurationStore, ExtensionRule, IntakeError, IntakeResult, MimeMapping, WidgetConfig,
};

/// Order mapping ids ascending: numeric ids first, numerically, then every
/// other id lexicographically.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Configuration problems detected when rules are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleWarning {
    /// Several mappings list the same MIME type; the first id wins.
    DuplicateMimeType {
        mime_type: String,
        mapping_ids: Vec<String>,
    },
    /// Several mapping records share one id; the first record wins.
    DuplicateMappingId { id: String },
    /// Several extension rules accept the same extension; the first rule wins.
    DuplicateExtension {
        extension: String,
        target_types: Vec<String>,
    },
    /// An extension rule accepts nothing.
    EmptyExtensionRule { target_type: String },
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateMimeType {
                mime_type,
                mapping_ids,
            } => write!(
                f,
                "MIME type '{}' is mapped by several records ({}); '{}' takes precedence",
                mime_type,
                mapping_ids.join(", "),
                mapping_ids.first().map(String::as_str).unwrap_or_default()
            ),
            Self::DuplicateMappingId { id } => {
                write!(f, "Mime mapping id '{}' is defined more than once", id)
            }
            Self::DuplicateExtension {
                extension,
                target_types,
            } => write!(
                f,
                "Extension '{}' is accepted by several types ({}); '{}' takes precedence",
                extension,
                target_types.join(", "),
                target_types.first().map(String::as_str).unwrap_or_default()
            ),
            Self::EmptyExtensionRule { target_type } => {
                write!(f, "Type '{}' accepts no file extensions", target_type)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    extension_rules: Vec<ExtensionRule>,
    /// Sorted by ascending id
    mime_mappings: Vec<MimeMapping>,
    warnings: Vec<RuleWarning>,
}

impl RuleSet {
    /// Build a rule set, sorting mappings by id and logging configuration warnings.
    pub fn new(extension_rules: Vec<ExtensionRule>, mut mime_mappings: Vec<MimeMapping>) -> Self {
        mime_mappings.sort_by(|a, b| compare_ids(&a.id, &b.id));

        let mut warnings = duplicate_id_warnings(&mime_mappings);
        // Records sharing an id are adjacent after the stable sort; the first one wins.
        mime_mappings.dedup_by(|later, first| later.id == first.id);
        warnings.extend(mapping_warnings(&mime_mappings));
        warnings.extend(extension_warnings(&extension_rules));
        for warning in &warnings {
            tracing::warn!(warning = %warning, "Classification rule configuration warning");
        }

        Self {
            extension_rules,
            mime_mappings,
            warnings,
        }
    }

    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Load the rules a widget classifies with.
    ///
    /// Failing to read the configuration is fatal for the whole batch.
    pub async fn load(store: &dyn ConfigurationStore, widget: &WidgetConfig) -> IntakeResult<Self> {
        let mime_mappings = store
            .load_mime_mappings()
            .await
            .map_err(IntakeError::RuleSetUnavailable)?;
        let extension_rules = store
            .load_extension_rules(widget)
            .await
            .map_err(IntakeError::RuleSetUnavailable)?;

        tracing::debug!(
            mime_mappings = mime_mappings.len(),
            extension_rules = extension_rules.len(),
            "Loaded classification rules"
        );

        Ok(Self::new(extension_rules, mime_mappings))
    }

    /// First extension rule (in configured order) accepting `extension`.
    pub fn find_extension_rule(&self, extension: &str) -> Option<&str> {
        self.extension_rules
            .iter()
            .find(|rule| rule.accepts(extension))
            .map(|rule| rule.target_type.as_str())
    }

    pub fn extension_rule(&self, target_type: &str) -> Option<&ExtensionRule> {
        self.extension_rules
            .iter()
            .find(|rule| rule.target_type == target_type)
    }

    /// Mapping id containing `mime_type`; the smallest id wins on duplicates.
    ///
    /// The match is exact and case-sensitive. Callers normalize first.
    pub fn find_mime_mapping(&self, mime_type: &str) -> Option<&str> {
        self.mime_mappings
            .iter()
            .find(|mapping| mapping.contains(mime_type))
            .map(|mapping| mapping.id.as_str())
    }

    /// Like [`find_mime_mapping`](Self::find_mime_mapping) but only considers
    /// `priority`'s target types, in that order.
    pub fn find_mime_mapping_in<'a>(
        &self,
        mime_type: &str,
        priority: &'a [String],
    ) -> Option<&'a str> {
        priority
            .iter()
            .find(|id| {
                self.mapping(id)
                    .is_some_and(|mapping| mapping.contains(mime_type))
            })
            .map(String::as_str)
    }

    pub fn mapping(&self, id: &str) -> Option<&MimeMapping> {
        self.mime_mappings.iter().find(|mapping| mapping.id == id)
    }

    /// Mapping ids in resolution order.
    pub fn target_types_by_priority(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.mime_mappings.len());
        for mapping in &self.mime_mappings {
            if !ids.contains(&mapping.id.as_str()) {
                ids.push(&mapping.id);
            }
        }
        ids
    }

    /// Union of every extension rule's extensions, first occurrence order.
    ///
    /// This is the list an upload field validator should accept.
    pub fn allowed_extensions(&self) -> Vec<String> {
        let mut allowed: Vec<String> = Vec::new();
        for extension in self.extension_rules.iter().flat_map(|r| r.extensions.iter()) {
            if !allowed.contains(extension) {
                allowed.push(extension.clone());
            }
        }
        allowed
    }

    pub fn extension_rules(&self) -> &[ExtensionRule] {
        &self.extension_rules
    }

    pub fn mime_mappings(&self) -> &[MimeMapping] {
        &self.mime_mappings
    }

    pub fn warnings(&self) -> &[RuleWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.extension_rules.is_empty() && self.mime_mappings.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    extension_rules: Vec<ExtensionRule>,
    mime_mappings: Vec<MimeMapping>,
}

impl RuleSetBuilder {
    pub fn extension_rule(mut self, rule: ExtensionRule) -> Self {
        self.extension_rules.push(rule);
        self
    }

    pub fn mime_mapping(mut self, mapping: MimeMapping) -> Self {
        self.mime_mappings.push(mapping);
        self
    }

    pub fn build(self) -> RuleSet {
        RuleSet::new(self.extension_rules, self.mime_mappings)
    }
}

/// Expects mappings already sorted by id.
fn duplicate_id_warnings(mappings: &[MimeMapping]) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();
    let mut seen_ids: Vec<&str> = Vec::new();
    for mapping in mappings {
        if seen_ids.contains(&mapping.id.as_str()) {
            warnings.push(RuleWarning::DuplicateMappingId {
                id: mapping.id.clone(),
            });
        } else {
            seen_ids.push(&mapping.id);
        }
    }
    warnings
}

/// Expects mappings sorted by id with unique ids.
fn mapping_warnings(mappings: &[MimeMapping]) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();

    let mut owners: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for mapping in mappings {
        for mime_type in &mapping.mime_types {
            let ids = owners.entry(mime_type.as_str()).or_default();
            if !ids.contains(&mapping.id) {
                ids.push(mapping.id.clone());
            }
        }
    }
    for (mime_type, mapping_ids) in owners {
        if mapping_ids.len() > 1 {
            warnings.push(RuleWarning::DuplicateMimeType {
                mime_type: mime_type.to_string(),
                mapping_ids,
            });
        }
    }

    warnings
}

fn extension_warnings(rules: &[ExtensionRule]) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();
    let mut owners: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for rule in rules {
        if rule.is_empty() {
            warnings.push(RuleWarning::EmptyExtensionRule {
                target_type: rule.target_type.clone(),
            });
        }
        for extension in &rule.extensions {
            owners
                .entry(extension.as_str())
                .or_default()
                .push(rule.target_type.clone());
        }
    }
    for (extension, target_types) in owners {
        if target_types.len() > 1 {
            warnings.push(RuleWarning::DuplicateExtension {
                extension: extension.to_string(),
                target_types,
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_rules() -> RuleSet {
        RuleSet::builder()
            .mime_mapping(MimeMapping::new("image", ["image/png", "image/jpeg"]))
            .mime_mapping(MimeMapping::new("document", ["application/pdf"]))
            .build()
    }

    #[test]
    fn test_compare_ids() {
        assert_eq!(compare_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_ids("audio", "image"), Ordering::Less);
        assert_eq!(compare_ids("10", "image"), Ordering::Less);
        assert_eq!(compare_ids("image", "image"), Ordering::Equal);
    }

    #[test]
    fn test_find_mime_mapping() {
        let rules = scenario_rules();
        assert_eq!(rules.find_mime_mapping("image/png"), Some("image"));
        assert_eq!(rules.find_mime_mapping("application/pdf"), Some("document"));
        assert_eq!(rules.find_mime_mapping("text/plain"), None);
        assert_eq!(rules.find_mime_mapping("IMAGE/PNG"), None);
        assert!(rules.warnings().is_empty());
    }

    #[test]
    fn test_duplicate_mime_type_resolves_to_smallest_id() {
        // inserted out of order on purpose
        let rules = RuleSet::builder()
            .mime_mapping(MimeMapping::new("photo", ["image/png"]))
            .mime_mapping(MimeMapping::new("image", ["image/png", "image/gif"]))
            .build();

        for _ in 0..3 {
            assert_eq!(rules.find_mime_mapping("image/png"), Some("image"));
        }
        assert_eq!(
            rules.warnings(),
            &[RuleWarning::DuplicateMimeType {
                mime_type: "image/png".to_string(),
                mapping_ids: vec!["image".to_string(), "photo".to_string()],
            }]
        );
    }

    #[test]
    fn test_numeric_ids_compare_numerically() {
        let rules = RuleSet::builder()
            .mime_mapping(MimeMapping::new("10", ["image/png"]))
            .mime_mapping(MimeMapping::new("9", ["image/png"]))
            .build();
        assert_eq!(rules.find_mime_mapping("image/png"), Some("9"));
        assert_eq!(rules.target_types_by_priority(), vec!["9", "10"]);
    }

    #[test]
    fn test_duplicate_mapping_id_warning() {
        let rules = RuleSet::builder()
            .mime_mapping(MimeMapping::new("image", ["image/png"]))
            .mime_mapping(MimeMapping::new("image", ["image/gif"]))
            .build();
        assert!(rules.warnings().contains(&RuleWarning::DuplicateMappingId {
            id: "image".to_string()
        }));
        assert_eq!(rules.target_types_by_priority(), vec!["image"]);
    }

    #[test]
    fn test_mixed_ids_resolve_to_same_winner_in_any_order() {
        let orders = [
            ["9", "10", "1a"],
            ["9", "1a", "10"],
            ["10", "9", "1a"],
            ["10", "1a", "9"],
            ["1a", "9", "10"],
            ["1a", "10", "9"],
        ];
        for order in orders {
            let rules = order
                .iter()
                .fold(RuleSet::builder(), |builder, id| {
                    builder.mime_mapping(MimeMapping::new(*id, ["image/png"]))
                })
                .build();
            assert_eq!(
                rules.find_mime_mapping("image/png"),
                Some("9"),
                "insertion order {order:?}"
            );
            assert_eq!(rules.target_types_by_priority(), vec!["9", "10", "1a"]);
        }

        assert_eq!(compare_ids("10", "1a"), Ordering::Less);
        assert_eq!(compare_ids("1a", "9"), Ordering::Greater);
    }

    #[test]
    fn test_duplicate_mapping_id_keeps_first_record() {
        let rules = RuleSet::builder()
            .mime_mapping(MimeMapping::new("image", ["image/png"]))
            .mime_mapping(MimeMapping::new("image", ["image/gif"]))
            .build();
        let priority = vec!["image".to_string()];

        assert_eq!(rules.mime_mappings().len(), 1);
        assert_eq!(rules.find_mime_mapping("image/png"), Some("image"));
        assert_eq!(rules.find_mime_mapping_in("image/png", &priority), Some("image"));
        assert_eq!(rules.find_mime_mapping("image/gif"), None);
        assert_eq!(rules.find_mime_mapping_in("image/gif", &priority), None);
    }

    #[test]
    fn test_find_mime_mapping_in_priority() {
        let rules = RuleSet::builder()
            .mime_mapping(MimeMapping::new("image", ["image/png"]))
            .mime_mapping(MimeMapping::new("photo", ["image/png"]))
            .build();
        let priority = vec!["photo".to_string(), "image".to_string()];
        assert_eq!(rules.find_mime_mapping_in("image/png", &priority), Some("photo"));

        let restricted = vec!["document".to_string()];
        assert_eq!(rules.find_mime_mapping_in("image/png", &restricted), None);
    }

    #[test]
    fn test_extension_lookups_and_warnings() {
        let rules = RuleSet::builder()
            .extension_rule(ExtensionRule::parse("image", "png jpg"))
            .extension_rule(ExtensionRule::parse("photo", "jpg"))
            .extension_rule(ExtensionRule::parse("empty", ""))
            .build();

        assert_eq!(rules.find_extension_rule("jpg"), Some("image"));
        assert_eq!(rules.find_extension_rule("JPG"), Some("image"));
        assert_eq!(rules.find_extension_rule(""), None);
        assert_eq!(rules.extension_rule("photo").map(|r| r.extensions.len()), Some(1));
        assert_eq!(rules.allowed_extensions(), vec!["jpg", "png"]);

        assert!(rules.warnings().contains(&RuleWarning::EmptyExtensionRule {
            target_type: "empty".to_string()
        }));
        assert!(rules.warnings().contains(&RuleWarning::DuplicateExtension {
            extension: "jpg".to_string(),
            target_types: vec!["image".to_string(), "photo".to_string()],
        }));
    }

    #[test]
    fn test_warning_display() {
        let warning = RuleWarning::DuplicateMimeType {
            mime_type: "image/png".to_string(),
            mapping_ids: vec!["image".to_string(), "photo".to_string()],
        };
        assert_eq!(
            warning.to_string(),
            "MIME type 'image/png' is mapped by several records (image, photo); 'image' takes precedence"
        );
    }
}
