//! Note command handlers

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::debug;

use notesmd_core::NoteRepository;

use super::validate_title;
use crate::editor::{confirm, edit_bytes};
use crate::output::{Output, OutputFormat};

/// Print a rendered note
pub fn view(repo: &NoteRepository, title: &str, output: &Output) -> Result<()> {
    let title = validate_title(title)?;
    match repo.load(title) {
        Ok(note) => output.print_note(&note),
        Err(e) if e.is_not_found() => {
            bail!(
                "Note '{}' does not exist yet. Create it with: notesmd edit \"{}\"",
                title,
                title
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// Print a note's raw markdown
pub fn raw(repo: &NoteRepository, title: &str, output: &Output) -> Result<()> {
    let title = validate_title(title)?;
    let raw = repo
        .load_raw(title)
        .with_context(|| format!("Failed to read note '{}'", title))?;

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({"title": title, "raw": String::from_utf8_lossy(&raw)})
        );
    } else {
        print!("{}", String::from_utf8_lossy(&raw));
    }
    Ok(())
}

/// Save a note from a file, or from stdin when no file is given
pub fn save(
    repo: &NoteRepository,
    title: &str,
    file: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let title = validate_title(title)?;

    let body = match file {
        Some(path) => {
            fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?
        }
        None => {
            let mut body = Vec::new();
            io::stdin()
                .read_to_end(&mut body)
                .context("Failed to read note body from stdin")?;
            body
        }
    };

    repo.save(title, &body)
        .with_context(|| format!("Failed to save note '{}'", title))?;
    output.success(&format!("Saved '{}' ({} bytes)", title, body.len()));
    Ok(())
}

/// Edit a note in $EDITOR, starting empty if it does not exist
pub fn edit(repo: &NoteRepository, title: &str, output: &Output) -> Result<()> {
    let title = validate_title(title)?;

    let initial = match repo.load_raw(title) {
        Ok(raw) => raw,
        Err(e) if e.is_not_found() => {
            debug!("Starting new note '{}'", title);
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    let edited = edit_bytes(&initial).context("Failed to edit note")?;
    if edited == initial && repo.exists(title) {
        output.message("No changes.");
        return Ok(());
    }

    repo.save(title, &edited)
        .with_context(|| format!("Failed to save note '{}'", title))?;
    output.success(&format!("Saved '{}'", title));
    Ok(())
}

/// Delete a note after confirmation
pub fn delete(repo: &NoteRepository, title: &str, yes: bool, output: &Output) -> Result<()> {
    let title = validate_title(title)?;

    if !yes && output.should_prompt() {
        println!("Delete note: {}", title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    repo.delete(title)
        .with_context(|| format!("Failed to delete note '{}'", title))?;
    output.success(&format!("Deleted '{}'", title));
    Ok(())
}

/// List every note
pub fn list(repo: &NoteRepository, output: &Output) -> Result<()> {
    let view = repo.all_files_view().context("Failed to list notes")?;
    output.print_listing(&view)
}

/// Print the title of a random note
pub fn random(repo: &NoteRepository, output: &Output) -> Result<()> {
    match repo.random().context("Failed to list notes")? {
        Some(file) => match output.format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"title": file.file_name}))
            }
            _ => println!("{}", file.file_name),
        },
        None => output.message("No notes yet."),
    }
    Ok(())
}
