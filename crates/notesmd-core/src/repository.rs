//! Note repository
//!
//! Maps note titles to `<notes_dir>/<title>.md` files:
//! - `load` reads and renders a note
//! - `save` overwrites it atomically (last writer wins)
//! - `delete` removes it
//! - `list` enumerates the notes directory
//!
//! Titles are not validated here; that belongs to whoever accepts them from
//! a user. A title is whatever precedes the first `.` of a file name, so a
//! note saved as "a.b" lists as "a" and cannot be loaded under its own name.
//!
//! ## Usage
//!
//! ```ignore
//! let repo = NoteRepository::new(Config::load()?)?;
//!
//! repo.save("Index", b"# Welcome\n\nSee {Todo}")?;
//! let note = repo.load("Index")?;
//! ```

use std::fs::{self, File};
use std::io::{self, Read};

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{NoteError, NoteResult};
use crate::models::{ExistingFile, ListingView, Note};
use crate::render::{resolve_links, RenderError, Renderer};
use crate::search::ContentSource;
use crate::storage::{atomic_write, list_file_names, TitleLocks};

/// Filesystem-backed note storage
///
/// Safe to share between threads; saves and deletes of one title are
/// serialized, everything else runs concurrently.
pub struct NoteRepository {
    config: Config,
    renderer: Renderer,
    locks: TitleLocks,
}

impl NoteRepository {
    /// Open the repository described by `config`
    ///
    /// Fails when the configured highlight theme does not exist.
    pub fn new(config: Config) -> Result<Self, RenderError> {
        let renderer = Renderer::new(&config)?;
        Ok(Self::with_renderer(config, renderer))
    }

    /// Open a repository with an already built renderer
    pub fn with_renderer(config: Config, renderer: Renderer) -> Self {
        Self {
            config,
            renderer,
            locks: TitleLocks::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the renderer
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    // ==================== Note Operations ====================

    /// Load and render a note
    ///
    /// Every read failure is reported as `NotFound`: to a caller the note
    /// is simply not there to show, and can be created.
    pub fn load(&self, title: &str) -> NoteResult<Note> {
        let raw = self.load_raw(title)?;
        let body = resolve_links(&self.renderer.render(&raw));
        debug!("Loaded note '{}' ({} bytes)", title, raw.len());

        Ok(Note {
            title: title.to_string(),
            raw,
            body,
            special: false,
        })
    }

    /// Read a note's raw markdown without rendering it
    pub fn load_raw(&self, title: &str) -> NoteResult<Vec<u8>> {
        let path = self.config.note_path(title);
        fs::read(&path).map_err(|e| NoteError::not_found(e, title, path))
    }

    /// Check whether a note file exists
    pub fn exists(&self, title: &str) -> bool {
        self.config.note_path(title).is_file()
    }

    /// Write a note, replacing any previous content
    pub fn save(&self, title: &str, raw: &[u8]) -> NoteResult<()> {
        let path = self.config.note_path(title);
        self.locks
            .lock(title)
            .run(|| atomic_write(&path, title, raw))?;
        info!("Saved note '{}' ({} bytes)", title, raw.len());
        Ok(())
    }

    /// Delete a note; deleting a missing note is an error
    pub fn delete(&self, title: &str) -> NoteResult<()> {
        let path = self.config.note_path(title);
        self.locks
            .lock(title)
            .run(|| fs::remove_file(&path))
            .map_err(|e| NoteError::from_io(e, title, path))?;
        info!("Deleted note '{}'", title);
        Ok(())
    }

    /// Enumerate notes in filesystem order
    ///
    /// Subdirectories (such as the attachments directory) and hidden files
    /// are skipped.
    pub fn list(&self) -> NoteResult<Vec<ExistingFile>> {
        let names = list_file_names(&self.config.notes_dir)?;
        Ok(names
            .iter()
            .filter(|name| !name.starts_with('.'))
            .map(|name| ExistingFile::new(title_from_file_name(name)))
            .collect())
    }

    /// Pick a random note, or `None` when there are no notes
    pub fn random(&self) -> NoteResult<Option<ExistingFile>> {
        let files = self.list()?;
        Ok(files.choose(&mut rand::thread_rng()).cloned())
    }

    /// Listing of every note, for an "All Files" page
    pub fn all_files_view(&self) -> NoteResult<ListingView> {
        Ok(ListingView::new("All Files", self.list()?, ""))
    }
}

impl ContentSource for NoteRepository {
    fn open_content(&self, title: &str) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(self.config.note_path(title))?;
        Ok(Box::new(file))
    }
}

/// Title of the note stored in `file_name`: everything before the first `.`
pub fn title_from_file_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            notes_dir: temp_dir.path().to_path_buf(),
            table_of_contents: false,
            ..Config::default()
        }
    }

    fn open(temp_dir: &TempDir) -> NoteRepository {
        NoteRepository::new(test_config(temp_dir)).unwrap()
    }

    #[test]
    fn test_unknown_theme_fails_to_open() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.highlight_theme = "does-not-exist".to_string();

        assert!(NoteRepository::new(config).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        repo.save("Index", b"# Welcome\n\nHello *world*").unwrap();

        let note = repo.load("Index").unwrap();
        assert_eq!(note.title, "Index");
        assert_eq!(note.raw, b"# Welcome\n\nHello *world*");
        assert!(note.body.contains("<em>world</em>"));
        assert!(!note.special);
        assert!(temp_dir.path().join("Index.md").is_file());
    }

    #[test]
    fn test_load_resolves_links() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        repo.save("Dinner", b"Cook {Pasta} tonight, {Pasta} again tomorrow")
            .unwrap();

        let note = repo.load("Dinner").unwrap();
        assert_eq!(note.body.matches("<a href=\"/view/Pasta\">Pasta</a>").count(), 2);
        assert!(!note.body.contains("{Pasta}"));
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        let err = repo.load("Nothing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        repo.save("Todo", b"a much longer first version").unwrap();
        repo.save("Todo", b"short").unwrap();

        assert_eq!(repo.load_raw("Todo").unwrap(), b"short");
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        repo.save("Gone", b"soon").unwrap();
        assert!(repo.exists("Gone"));

        repo.delete("Gone").unwrap();
        assert!(!repo.exists("Gone"));
        assert!(repo.load("Gone").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_missing_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        assert!(repo.delete("Never").is_err());
    }

    #[test]
    fn test_list_strips_extension_and_skips_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        repo.save("Apple", b"a").unwrap();
        repo.save("Banana", b"b").unwrap();
        fs::create_dir(temp_dir.path().join("att")).unwrap();
        fs::write(temp_dir.path().join(".hidden"), "x").unwrap();

        let mut titles: Vec<String> = repo
            .list()
            .unwrap()
            .into_iter()
            .map(|f| {
                assert!(f.exists);
                f.file_name
            })
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["Apple".to_string(), "Banana".to_string()]);
    }

    #[test]
    fn test_multi_dot_title_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        repo.save("v1.2", b"release notes").unwrap();

        let files = repo.list().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "v1");
        assert!(repo.load("v1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_title_from_file_name() {
        assert_eq!(title_from_file_name("Index.md"), "Index");
        assert_eq!(title_from_file_name("a.b.md"), "a");
        assert_eq!(title_from_file_name("README"), "README");
    }

    #[test]
    fn test_random() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        assert!(repo.random().unwrap().is_none());

        repo.save("Only", b"one").unwrap();
        assert_eq!(repo.random().unwrap().unwrap().file_name, "Only");
    }

    #[test]
    fn test_all_files_view() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);
        repo.save("Index", b"").unwrap();

        let view = repo.all_files_view().unwrap();
        assert_eq!(view.title, "All Files");
        assert!(view.special);
        assert_eq!(view.files, vec![ExistingFile::new("Index")]);
    }

    #[test]
    fn test_list_missing_notes_dir_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let repo = NoteRepository::new(Config {
            notes_dir: temp_dir.path().join("missing"),
            ..Config::default()
        })
        .unwrap();

        assert!(matches!(
            repo.list().unwrap_err(),
            NoteError::ListDirectory { .. }
        ));
    }
}
