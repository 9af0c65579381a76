//! Search command handler

use anyhow::{Context, Result};

use notesmd_core::{search_view, NoteRepository};

use crate::output::Output;

/// Search notes by title and content
///
/// Queries of one or two characters only match titles.
pub fn search(repo: &NoteRepository, criteria: &str, output: &Output) -> Result<()> {
    let view = search_view(repo, criteria)
        .with_context(|| format!("Failed to search for '{}'", criteria))?;
    output.print_listing(&view)
}
