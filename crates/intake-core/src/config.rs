//! Configuration module
//!
//! Environment-driven settings for the upload widget and the intake workflow.

use std::env;

use crate::models::{ClassificationStrategy, WidgetConfig};

const UPLOAD_LOCATION: &str = "public://";
const FIRST_STEP_BUTTON_TEXT: &str = "Create media items";
const SUBMIT_TEXT: &str = "Save and continue";
const MAX_BATCH_SIZE: usize = 50;

/// Intake workflow configuration
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    pub environment: String,
    pub upload_location: String,
    pub first_step_button_text: String,
    pub submit_text: String,
    /// Target types selected for the widget (comma-separated in the environment)
    pub media_types: Vec<String>,
    pub classification_strategy: ClassificationStrategy,
    /// Maximum number of files accepted in one batch
    pub max_batch_size: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            upload_location: UPLOAD_LOCATION.to_string(),
            first_step_button_text: FIRST_STEP_BUTTON_TEXT.to_string(),
            submit_text: SUBMIT_TEXT.to_string(),
            media_types: Vec::new(),
            classification_strategy: ClassificationStrategy::default(),
            max_batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let media_types = parse_list(&env::var("INTAKE_MEDIA_TYPES").unwrap_or_default());

        let classification_strategy = env::var("INTAKE_CLASSIFICATION_MODE")
            .unwrap_or_else(|_| "mime".to_string())
            .parse::<ClassificationStrategy>()
            .map_err(|e| anyhow::anyhow!("INTAKE_CLASSIFICATION_MODE: {}", e))?;

        let max_batch_size = env::var("INTAKE_MAX_BATCH_SIZE")
            .unwrap_or_else(|_| MAX_BATCH_SIZE.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("INTAKE_MAX_BATCH_SIZE must be a valid number"))?;

        Ok(Self {
            environment,
            upload_location: env::var("INTAKE_UPLOAD_LOCATION")
                .unwrap_or_else(|_| UPLOAD_LOCATION.to_string()),
            first_step_button_text: env::var("INTAKE_FIRST_STEP_BUTTON_TEXT")
                .unwrap_or_else(|_| FIRST_STEP_BUTTON_TEXT.to_string()),
            submit_text: env::var("INTAKE_SUBMIT_TEXT").unwrap_or_else(|_| SUBMIT_TEXT.to_string()),
            media_types,
            classification_strategy,
            max_batch_size,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.classification_strategy == ClassificationStrategy::Extension
            && self.media_types.is_empty()
        {
            return Err(anyhow::anyhow!(
                "INTAKE_MEDIA_TYPES must select at least one media type for extension classification"
            ));
        }

        if self.first_step_button_text.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "INTAKE_FIRST_STEP_BUTTON_TEXT cannot be empty"
            ));
        }

        if self.submit_text.trim().is_empty() {
            return Err(anyhow::anyhow!("INTAKE_SUBMIT_TEXT cannot be empty"));
        }

        if self.max_batch_size == 0 {
            return Err(anyhow::anyhow!("INTAKE_MAX_BATCH_SIZE must be at least 1"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    /// Widget settings derived from this configuration.
    pub fn widget(&self) -> WidgetConfig {
        WidgetConfig {
            upload_location: self.upload_location.clone(),
            first_step_button_text: self.first_step_button_text.clone(),
            submit_text: self.submit_text.clone(),
            media_types: self.media_types.clone(),
            strategy: self.classification_strategy,
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("image, document,,video "), vec!["image", "document", "video"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(IntakeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_extension_strategy_requires_media_types() {
        let mut config = IntakeConfig {
            classification_strategy: ClassificationStrategy::Extension,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());

        config.media_types = vec!["image".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_batch_size_and_blank_labels() {
        let config = IntakeConfig {
            max_batch_size: 0,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = IntakeConfig {
            submit_text: "  ".to_string(),
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_widget_carries_settings() {
        let config = IntakeConfig {
            media_types: vec!["image".to_string()],
            classification_strategy: ClassificationStrategy::Extension,
            ..IntakeConfig::default()
        };
        let widget = config.widget();
        assert_eq!(widget.upload_location, "public://");
        assert_eq!(widget.media_types, vec!["image"]);
        assert_eq!(widget.strategy, ClassificationStrategy::Extension);
    }

    #[test]
    fn test_is_production() {
        let config = IntakeConfig {
            environment: "PROD".to_string(),
            ..IntakeConfig::default()
        };
        assert!(config.is_production());
        assert!(!IntakeConfig::default().is_production());
    }
}
