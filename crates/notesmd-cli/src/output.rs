//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;

use notesmd_core::{ExistingFile, ListingView, Note};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a rendered note
    pub fn print_note(&self, note: &Note) -> Result<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", note.body),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "title": note.title,
                    "html": note.body,
                    "raw": note.raw_text(),
                    "special": note.special,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Ok(())
    }

    /// Print a listing page (all notes, search results, attachments)
    pub fn print_listing(&self, view: &ListingView) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("{}", view.title);
                println!();
                if view.files.is_empty() {
                    println!("Nothing found.");
                    return Ok(());
                }
                for file in &view.files {
                    println!("{}", describe(file));
                }
                let existing = view.files.iter().filter(|f| f.exists).count();
                println!("\n{} file(s)", existing);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(view)?);
            }
            OutputFormat::Quiet => {
                for file in view.files.iter().filter(|f| f.exists) {
                    println!("{}", file.file_name);
                }
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// One human-readable line for a listing entry
fn describe(file: &ExistingFile) -> String {
    if !file.exists {
        format!("+ {} (new note)", truncate(&file.file_name, 60))
    } else if file.hits > 0 {
        format!("  {} [{} hit(s)]", truncate(&file.file_name, 60), file.hits)
    } else {
        format!("  {}", truncate(&file.file_name, 60))
    }
}

/// Truncate a string to max length in characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
