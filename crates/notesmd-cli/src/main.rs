//! notesmd CLI
//!
//! Command-line interface for notesmd - markdown notes kept as plain files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use notesmd_core::{AttachmentStore, Config, NoteRepository};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "notesmd")]
#[command(about = "notesmd - Markdown notes kept as plain files")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the notes directory
    #[arg(long, global = true, value_name = "PATH")]
    notes_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note to HTML
    View {
        /// Note title
        title: String,
    },
    /// Print a note's raw markdown
    Raw {
        /// Note title
        title: String,
    },
    /// Save a note from a file or stdin
    Save {
        /// Note title
        title: String,
        /// Read the body from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Edit a note in $EDITOR
    Edit {
        /// Note title
        title: String,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note title
        title: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List all notes
    #[command(alias = "ls")]
    List,
    /// Print the title of a random note
    Random,
    /// Search note titles and contents
    Search {
        /// Search text (titles only when shorter than three characters)
        criteria: String,
    },
    /// Manage attachments
    Attach {
        #[command(subcommand)]
        command: AttachCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum AttachCommands {
    /// Copy a file into the attachments directory
    Add {
        /// File to attach
        path: PathBuf,
        /// Store under this name instead of the file's name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List attachments
    #[command(alias = "ls")]
    List,
    /// Delete an attachment
    Rm {
        /// Attachment name
        name: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (notes_dir, highlight_theme, table_of_contents, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config = load_config(cli.config.as_ref(), cli.notes_dir.clone())?;
    init_logging(&config, cli.verbose);

    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &config, cli.config.as_ref(), &output);
    }

    config.ensure_notes_dir()?;
    debug!("Using notes directory {:?}", config.notes_dir);

    let repo = NoteRepository::new(config.clone()).context("Failed to set up renderer")?;
    let attachments = AttachmentStore::new(&config);

    match cli.command {
        Commands::View { title } => commands::note::view(&repo, &title, &output),
        Commands::Raw { title } => commands::note::raw(&repo, &title, &output),
        Commands::Save { title, file } => commands::note::save(&repo, &title, file, &output),
        Commands::Edit { title } => commands::note::edit(&repo, &title, &output),
        Commands::Delete { title, yes } => commands::note::delete(&repo, &title, yes, &output),
        Commands::List => commands::note::list(&repo, &output),
        Commands::Random => commands::note::random(&repo, &output),
        Commands::Search { criteria } => commands::search::search(&repo, &criteria, &output),
        Commands::Attach { command } => handle_attach_command(command, &attachments, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Load configuration and apply the `--notes-dir` override
///
/// Creates nothing on disk, so a directory named only by the config file
/// is never made when the flag points elsewhere.
fn load_config(config_path: Option<&PathBuf>, notes_dir: Option<PathBuf>) -> Result<Config> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    if let Some(notes_dir) = notes_dir {
        config.notes_dir = notes_dir;
    }
    Ok(config)
}

fn handle_attach_command(
    command: AttachCommands,
    attachments: &AttachmentStore,
    output: &Output,
) -> Result<()> {
    match command {
        AttachCommands::Add { path, name } => {
            commands::attachment::add(attachments, path, name, output)
        }
        AttachCommands::List => commands::attachment::list(attachments, output),
        AttachCommands::Rm { name } => commands::attachment::remove(attachments, &name, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config: &Config,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config, config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(&key, &value, config_path, output)
        }
    }
}

/// Send tracing output to stderr
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to both
/// crates, raised to debug by `--verbose`.
fn init_logging(config: &Config, verbose: bool) {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.is_empty() => EnvFilter::new(filter),
        _ => {
            let log_level = if verbose { "debug" } else { config.log_level.as_str() };
            EnvFilter::new(format!(
                "notesmd_core={},notesmd_cli={}",
                log_level, log_level
            ))
        }
    };

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_writer(std::io::stderr)
        .try_init();
}
