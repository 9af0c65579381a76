//! Attachment command handlers

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};

use notesmd_core::AttachmentStore;

use crate::output::Output;

/// Copy a local file into the attachments directory
pub fn add(
    attachments: &AttachmentStore,
    path: PathBuf,
    name: Option<String>,
    output: &Output,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("Cannot derive an attachment name from {:?}", path))?,
    };

    let mut source = File::open(&path).with_context(|| format!("Failed to open {:?}", path))?;
    let written = attachments
        .store(&name, &mut source)
        .with_context(|| format!("Failed to store attachment '{}'", name))?;

    output.success(&format!("Attached '{}' ({} bytes)", name, written));
    Ok(())
}

/// List attachments
pub fn list(attachments: &AttachmentStore, output: &Output) -> Result<()> {
    let view = attachments.view().context("Failed to list attachments")?;
    output.print_listing(&view)
}

/// Remove an attachment; removing a missing one succeeds
pub fn remove(attachments: &AttachmentStore, name: &str, output: &Output) -> Result<()> {
    attachments
        .delete(name)
        .with_context(|| format!("Failed to delete attachment '{}'", name))?;
    output.success(&format!("Removed '{}'", name));
    Ok(())
}
