//! intake: classify files against a rule file from the command line.
//!
//! Settings come from the environment (see `IntakeConfig::from_env`); flags
//! override the classification mode and the selected target types.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use intake_cli::{init_tracing, load_rule_file, parse_file_arg};
use intake_core::{ClassificationStrategy, IntakeConfig, SessionPhase, WidgetConfig};
use intake_processing::memory::RecordingPersistence;
use intake_processing::{IntakeContext, RuleSet, UploadSession};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "intake", about = "Classify uploaded files into draft entities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run files through an upload session and print the result
    Classify {
        /// JSON rule file
        #[arg(long)]
        rules: PathBuf,
        /// Classification mode: mime or extension
        #[arg(long)]
        mode: Option<ClassificationStrategy>,
        /// Selected target type (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,
        /// Commit the drafts after classification
        #[arg(long)]
        commit: bool,
        /// Files as NAME or NAME:MIME
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Validate a rule file and list configuration warnings
    CheckRules {
        /// JSON rule file
        #[arg(long)]
        rules: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            rules,
            mode,
            types,
            commit,
            files,
        } => {
            let mut config = IntakeConfig::from_env().context("Failed to load configuration")?;
            if let Some(mode) = mode {
                config.classification_strategy = mode;
            }
            if !types.is_empty() {
                config.media_types = types;
            }
            config.validate()?;

            let rule_file = load_rule_file(&rules)?;
            let context = IntakeContext::from_config(
                &config,
                Arc::new(rule_file.store()?),
                Arc::new(rule_file.catalog()),
                Arc::new(RecordingPersistence::new()),
            );
            tracing::debug!(mode = ?context.mode(), "Classifying files");

            let files = files
                .iter()
                .map(|arg| parse_file_arg(arg))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let mut session = UploadSession::new(Arc::new(context));
            let batch = session.submit_batch(files).await?;
            let commit = if commit && session.phase() == SessionPhase::Editing {
                Some(session.commit().await?)
            } else {
                None
            };

            print_json(&serde_json::json!({
                "batch": batch,
                "commit": commit,
                "session": session.snapshot(),
            }))?;
        }
        Commands::CheckRules { rules } => {
            let rule_file = load_rule_file(&rules)?;
            let store = rule_file.store()?;
            let rule_set = RuleSet::load(&store, &WidgetConfig::default()).await?;

            let warnings: Vec<String> = rule_set.warnings().iter().map(ToString::to_string).collect();
            print_json(&serde_json::json!({
                "mime_mappings": rule_set.mime_mappings().len(),
                "extension_rules": rule_set.extension_rules().len(),
                "target_types_by_priority": rule_set.target_types_by_priority(),
                "allowed_extensions": rule_set.allowed_extensions(),
                "warnings": warnings,
            }))?;
        }
    }

    Ok(())
}
