//! External editor support
//!
//! A note is edited as a draft file named `notesmd-*.md` in the system temp
//! directory. The draft is owned by a `tempfile` handle, so it is removed on
//! every exit path, and concurrent edits never share a draft.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tempfile::Builder;

/// Editors tried in order when neither $VISUAL nor $EDITOR is set
#[cfg(unix)]
const FALLBACK_EDITORS: &[&str] = &["nano", "vim", "vi"];
#[cfg(not(unix))]
const FALLBACK_EDITORS: &[&str] = &["notepad"];

/// Let the user edit `initial` and return what they saved
pub fn edit_bytes(initial: &[u8]) -> Result<Vec<u8>> {
    let editor = choose_editor(|name| env::var(name).ok(), on_path).context(
        "No editor found. Set $EDITOR environment variable.\n\
         Example: export EDITOR=nano",
    )?;
    edit_with(&editor, initial)
}

/// Run `editor` over a draft holding `initial` and read the draft back
fn edit_with(editor: &str, initial: &[u8]) -> Result<Vec<u8>> {
    let mut draft = Builder::new()
        .prefix("notesmd-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create draft file")?;
    draft
        .write_all(initial)
        .and_then(|()| draft.flush())
        .context("Failed to write draft file")?;

    let status = editor_command(editor, draft.path())?
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;
    if !status.success() {
        bail!(
            "Editor '{}' exited with {}; the note was left unchanged",
            editor,
            status
        );
    }

    // Editors may replace the file rather than write into it, so read by path.
    fs::read(draft.path()).with_context(|| format!("Failed to read draft {:?}", draft.path()))
}

/// Build the command for an editor setting such as `code --wait`
fn editor_command(editor: &str, file: &Path) -> Result<Command> {
    let mut words = editor.split_whitespace();
    let Some(program) = words.next() else {
        bail!("Editor command is empty");
    };
    let mut command = Command::new(program);
    command.args(words).arg(file);
    Ok(command)
}

/// $VISUAL, then $EDITOR, then the first installed fallback
fn choose_editor(
    var: impl Fn(&str) -> Option<String>,
    installed: impl Fn(&str) -> bool,
) -> Option<String> {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|name| var(name))
        .find(|value| !value.trim().is_empty())
        .or_else(|| {
            FALLBACK_EDITORS
                .iter()
                .copied()
                .find(|&editor| installed(editor))
                .map(str::to_string)
        })
}

fn on_path(program: &str) -> bool {
    env::var_os("PATH").is_some_and(|paths| {
        env::split_paths(&paths).any(|dir| {
            dir.join(program).is_file() || dir.join(format!("{}.exe", program)).is_file()
        })
    })
}

/// Ask a yes/no question on the terminal; anything but yes means no
///
/// Without a terminal on stdin nothing is asked and the answer is no.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
