//! Filesystem primitives shared by notes and attachments
//!
//! Uses atomic writes (write to temp file, then rename) so a reader never
//! observes a partially written file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{NoteError, NoteResult};

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The temp file is removed if any step fails.
pub fn atomic_write(path: &Path, name: &str, data: &[u8]) -> NoteResult<()> {
    let temp_path = temp_path_for(path);

    let result = write_and_sync(&temp_path, name, data).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|source| NoteError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_sync(temp_path: &Path, name: &str, data: &[u8]) -> NoteResult<()> {
    let to_error = |e| NoteError::from_io(e, name, temp_path.to_path_buf());

    let mut file = File::create(temp_path).map_err(to_error)?;
    file.write_all(data).map_err(to_error)?;
    file.sync_all().map_err(to_error)?;
    Ok(())
}

/// Hidden, unique sibling of `path` used as the source of an atomic rename
///
/// The leading dot marks it hidden so note listings skip it; the uuid keeps
/// concurrent writers from sharing a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
}

/// Names of the regular (non-directory) entries of `dir`, in enumeration order
pub fn list_file_names(dir: &Path) -> NoteResult<Vec<String>> {
    let list_error = |source| NoteError::ListDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        let file_type = entry.file_type().map_err(list_error)?;
        if file_type.is_dir() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Create `dir` if it does not exist yet
pub fn ensure_dir(dir: &Path) -> NoteResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| NoteError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}
