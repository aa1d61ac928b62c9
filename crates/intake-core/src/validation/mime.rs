//! MIME type validation module
//!
//! Provides validation for the MIME type lists stored on mapping records:
//! - Pattern validation at configuration-save time (`token/token`)
//! - Normalization of declared MIME types before they are matched
//! - Parsing of the one-per-line textarea format used by the admin form

use std::borrow::Cow;

use anyhow::{Context, Result};
use regex::Regex;

/// Pattern every configured MIME type must match.
///
/// A token is made of letters, digits, `-` and `+`.
pub const MIME_TYPE_PATTERN: &str = r"^[A-Za-z0-9+\-]+/[A-Za-z0-9+\-]+$";

/// Validate a single configured MIME type.
pub fn validate_mime_type(mime_type: &str) -> Result<()> {
    if mime_type.is_empty() {
        return Err(anyhow::anyhow!("MIME type cannot be empty"));
    }

    let pattern =
        Regex::new(MIME_TYPE_PATTERN).context("Failed to compile MIME type validation regex")?;

    if !pattern.is_match(mime_type) {
        return Err(anyhow::anyhow!(
            "MIME type '{}' is malformed. Expected 'type/subtype' using letters, digits, '-' or '+'",
            mime_type
        ));
    }

    Ok(())
}

/// `validator` hook for the `mime_types` field of a mapping form.
pub fn validate_mime_type_list(mime_types: &[String]) -> Result<(), validator::ValidationError> {
    for mime_type in mime_types {
        if let Err(e) = validate_mime_type(mime_type) {
            let mut error = validator::ValidationError::new("mime_type");
            error.message = Some(Cow::Owned(e.to_string()));
            error.add_param(Cow::Borrowed("value"), mime_type);
            return Err(error);
        }
    }
    Ok(())
}

/// Strip MIME parameters (`; charset=...`) and surrounding whitespace.
///
/// Declared MIME types come from the client and are never assumed normalized.
/// Case is preserved: mapping lookups are case-sensitive.
pub fn normalize_mime_type(declared: &str) -> &str {
    declared.split(';').next().unwrap_or_default().trim()
}

/// Split textarea input into trimmed MIME types, one per line.
///
/// Blank lines are dropped; both `\n` and `\r\n` separators are accepted.
pub fn parse_mime_type_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mime_type_ok() {
        assert!(validate_mime_type("image/png").is_ok());
        assert!(validate_mime_type("image/svg+xml").is_ok());
        assert!(validate_mime_type("application/x-tar").is_ok());
        assert!(validate_mime_type("Video/MP4").is_ok());
    }

    #[test]
    fn test_validate_mime_type_malformed() {
        assert!(validate_mime_type("").is_err());
        assert!(validate_mime_type("image").is_err());
        assert!(validate_mime_type("image/").is_err());
        assert!(validate_mime_type("/png").is_err());
        assert!(validate_mime_type("image/png/extra").is_err());
        assert!(validate_mime_type("image/png; charset=binary").is_err());
        assert!(validate_mime_type("image /png").is_err());
    }

    #[test]
    fn test_validate_mime_type_list_reports_offending_value() {
        let list = vec!["image/png".to_string(), "not a mime".to_string()];
        let err = validate_mime_type_list(&list).unwrap_err();
        assert_eq!(err.code, "mime_type");
        assert!(err.message.unwrap().contains("not a mime"));
    }

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(normalize_mime_type("image/png"), "image/png");
        assert_eq!(normalize_mime_type("image/png; charset=binary"), "image/png");
        assert_eq!(normalize_mime_type("  text/plain ;charset=utf-8"), "text/plain");
        assert_eq!(normalize_mime_type(""), "");
        assert_eq!(normalize_mime_type("; charset=utf-8"), "");
        // case is preserved
        assert_eq!(normalize_mime_type("Image/PNG"), "Image/PNG");
    }

    #[test]
    fn test_parse_mime_type_lines() {
        let parsed = parse_mime_type_lines("image/png\r\n  image/jpeg  \n\n application/pdf\n");
        assert_eq!(parsed, vec!["image/png", "image/jpeg", "application/pdf"]);
        assert!(parse_mime_type_lines("   \n").is_empty());
    }
}
