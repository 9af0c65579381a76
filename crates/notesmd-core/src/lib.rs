//! notesmd Core Library
//!
//! This crate provides the note-management engine for notesmd, a personal
//! note store where every note is a markdown file named after its title.
//!
//! # Architecture
//!
//! - **Files are the source of truth**: `<notes_dir>/<title>.md` per note,
//!   `<notes_dir>/att/<name>` per attachment. No index, no database.
//! - **Rendering is derived**: HTML is produced on every load and never stored.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let repo = NoteRepository::new(config.clone())?;
//!
//! repo.save("Index", b"# Hello\n\nSee {Todo}")?;
//! let note = repo.load("Index")?;
//!
//! let view = search_view(&repo, "todo")?;
//! ```
//!
//! # Modules
//!
//! - `repository`: load, save, delete and list notes (main entry point)
//! - `render`: markdown rendering, code highlighting, `{Title}` links
//! - `search`: filename and content search
//! - `attachments`: uploaded files
//! - `storage`: atomic writes and per-title locks
//! - `models`: notes, listing entries, listing pages
//! - `config`: application configuration

pub mod attachments;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod repository;
pub mod search;
pub mod storage;

pub use attachments::AttachmentStore;
pub use config::Config;
pub use error::{NoteError, NoteResult};
pub use models::{ExistingFile, ListingView, Note};
pub use render::{resolve_links, LanguageDetector, RenderError, Renderer};
pub use repository::NoteRepository;
pub use search::{search, search_view, ContentSource};
