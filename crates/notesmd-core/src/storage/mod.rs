//! Storage layer
//!
//! Notes and attachments are plain files; there is no index or database.
//!
//! ## Pieces
//!
//! - **persistence**: atomic writes, directory listing, lazy directory creation
//! - **locks**: per-title mutual exclusion for writers

pub mod locks;
pub mod persistence;

pub use locks::{TitleGuard, TitleLocks};
pub use persistence::{atomic_write, ensure_dir, list_file_names};
