//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use notesmd_core::render::Highlighter;
use notesmd_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config: &Config, config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "notes_dir": config.notes_dir,
                    "attachments_dir": config.attachments_dir(),
                    "highlight_theme": config.highlight_theme,
                    "table_of_contents": config.table_of_contents,
                    "log_level": config.log_level,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.notes_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  notes_dir:         {}", config.notes_dir.display());
            println!("  attachments_dir:   {}", config.attachments_dir().display());
            println!("  highlight_theme:   {}", config.highlight_theme);
            println!("  table_of_contents: {}", config.table_of_contents);
            println!("  log_level:         {}", config.log_level);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: &str, value: &str, config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, key, value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply one `key = value` change to `config`
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "notes_dir" => {
            config.notes_dir = value.into();
        }
        "highlight_theme" => {
            let themes = Highlighter::available_themes();
            if !themes.iter().any(|t| t == value) {
                bail!(
                    "Unknown highlight theme '{}'. Available themes: {}",
                    value,
                    themes.join(", ")
                );
            }
            config.highlight_theme = value.to_string();
        }
        "table_of_contents" => {
            config.table_of_contents = value
                .parse()
                .context("Invalid value for table_of_contents. Use 'true' or 'false'.")?;
        }
        "log_level" => {
            config.log_level = value.to_string();
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: notes_dir, highlight_theme, table_of_contents, log_level",
                key
            );
        }
    }
    Ok(())
}
