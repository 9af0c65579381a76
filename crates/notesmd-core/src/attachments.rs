//! Attachment store
//!
//! Uploaded files live in `<notes_dir>/att/` under the name they were
//! uploaded with. A second upload with the same name replaces the first.
//! The directory is created on the first upload.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{NoteError, NoteResult};
use crate::models::{ExistingFile, ListingView};
use crate::storage::{ensure_dir, list_file_names};

/// Directory of uploaded files
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    /// Attachment store for the notes directory in `config`
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.attachments_dir(),
        }
    }

    /// Directory holding the attachments
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Path of the attachment `name`, rejecting names that leave the directory
    pub fn path(&self, name: &str) -> NoteResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(name))
    }

    /// Create (or truncate) the attachment `name` and return it for writing
    ///
    /// The file is closed when the handle is dropped.
    pub fn create(&self, name: &str) -> NoteResult<File> {
        let path = self.path(name)?;
        ensure_dir(&self.dir)?;
        File::create(&path).map_err(|e| NoteError::from_io(e, name, path))
    }

    /// Stream `reader` into the attachment `name`
    ///
    /// Returns the number of bytes written. If copying fails the partial
    /// file is removed and the error returned.
    pub fn store(&self, name: &str, reader: &mut impl Read) -> NoteResult<u64> {
        let path = self.path(name)?;
        let mut file = self.create(name)?;

        match copy_and_sync(reader, &mut file) {
            Ok(written) => {
                info!("Stored attachment '{}' ({} bytes)", name, written);
                Ok(written)
            }
            Err(e) => {
                drop(file);
                if let Err(remove_err) = fs::remove_file(&path) {
                    warn!(
                        "Could not remove partial attachment {:?}: {}",
                        path, remove_err
                    );
                }
                Err(NoteError::from_io(e, name, path))
            }
        }
    }

    /// Read back the attachment `name`
    pub fn read(&self, name: &str) -> NoteResult<Vec<u8>> {
        let path = self.path(name)?;
        fs::read(&path).map_err(|e| NoteError::from_io(e, name, path))
    }

    /// Enumerate attachments in filesystem order, names as stored
    ///
    /// A missing attachments directory means there are no attachments yet.
    pub fn list(&self) -> NoteResult<Vec<ExistingFile>> {
        if !self.dir.exists() {
            debug!("No attachments directory at {:?}", self.dir);
            return Ok(Vec::new());
        }
        let names = list_file_names(&self.dir)?;
        Ok(names.into_iter().map(ExistingFile::new).collect())
    }

    /// Delete the attachment `name`; a missing attachment is not an error
    pub fn delete(&self, name: &str) -> NoteResult<()> {
        let path = self.path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted attachment '{}'", name);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Attachment '{}' already gone", name);
                Ok(())
            }
            Err(e) => Err(NoteError::from_io(e, name, path)),
        }
    }

    /// Listing of every attachment, for an "Attachments" page
    pub fn view(&self) -> NoteResult<ListingView> {
        Ok(ListingView::new("Attachments", self.list()?, ""))
    }
}

fn copy_and_sync(reader: &mut impl Read, file: &mut File) -> io::Result<u64> {
    let written = io::copy(reader, file)?;
    file.flush()?;
    file.sync_all()?;
    Ok(written)
}

/// Reject names that are empty or could point outside the attachments directory
fn validate_name(name: &str) -> NoteResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(NoteError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> AttachmentStore {
        AttachmentStore::new(&Config::with_notes_dir(temp_dir.path()))
    }

    /// Reader that yields some bytes, then fails
    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "upload aborted"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"half");
            Ok(4)
        }
    }

    #[test]
    fn test_create_makes_directory() {
        let temp_dir = TempDir::new().unwrap();
        let attachments = store(&temp_dir);
        assert!(!attachments.dir().exists());

        let mut file = attachments.create("photo.jpg").unwrap();
        file.write_all(b"jpeg bytes").unwrap();
        drop(file);

        assert!(temp_dir.path().join("att").is_dir());
        assert_eq!(attachments.read("photo.jpg").unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_store_overwrites_same_name() {
        let temp_dir = TempDir::new().unwrap();
        let attachments = store(&temp_dir);

        let written = attachments
            .store("report.pdf", &mut &b"first version"[..])
            .unwrap();
        assert_eq!(written, 13);
        assert_eq!(attachments.read("report.pdf").unwrap(), b"first version");

        attachments.store("report.pdf", &mut &b"v2"[..]).unwrap();
        assert_eq!(attachments.read("report.pdf").unwrap(), b"v2");
        assert_eq!(attachments.list().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_upload_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        let attachments = store(&temp_dir);

        let err = attachments
            .store("broken.bin", &mut FailingReader { sent: false })
            .unwrap_err();
        assert!(matches!(err, NoteError::WriteError { .. }));
        assert!(!attachments.dir().join("broken.bin").exists());
    }

    #[test]
    fn test_list_keeps_names_and_skips_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let attachments = store(&temp_dir);

        attachments.store("archive.tar.gz", &mut &b"x"[..]).unwrap();
        fs::create_dir(attachments.dir().join("nested")).unwrap();

        let files = attachments.list().unwrap();
        assert_eq!(files, vec![ExistingFile::new("archive.tar.gz")]);
    }

    #[test]
    fn test_list_without_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(store(&temp_dir).list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let attachments = store(&temp_dir);

        attachments.store("tmp.txt", &mut &b"x"[..]).unwrap();
        attachments.delete("tmp.txt").unwrap();
        attachments.delete("tmp.txt").unwrap();
        attachments.delete("never-existed.txt").unwrap();

        assert!(attachments.list().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_escaping_names() {
        let temp_dir = TempDir::new().unwrap();
        let attachments = store(&temp_dir);

        for name in ["", "..", "../Index.md", "a/b", "a\\b"] {
            assert!(matches!(
                attachments.create(name).unwrap_err(),
                NoteError::InvalidName { .. }
            ));
        }
    }

    #[test]
    fn test_attachments_view() {
        let temp_dir = TempDir::new().unwrap();
        let attachments = store(&temp_dir);
        attachments.store("a.png", &mut &b"x"[..]).unwrap();

        let view = attachments.view().unwrap();
        assert_eq!(view.title, "Attachments");
        assert!(view.special);
        assert_eq!(view.files.len(), 1);
    }
}
