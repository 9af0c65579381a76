//! Data models for notesmd
//!
//! Defines the core data structures: Note, ExistingFile and ListingView.

use serde::{Deserialize, Serialize};

/// A markdown note, fully materialized for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// Title, identical to the file stem on disk
    pub title: String,
    /// Raw markdown bytes as stored
    pub raw: Vec<u8>,
    /// HTML rendered from `raw`, recomputed on every load
    pub body: String,
    /// True for system-generated listing pages
    pub special: bool,
}

impl Note {
    /// Create an unsaved, empty note (what an editor starts from)
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            raw: Vec::new(),
            body: String::new(),
            special: false,
        }
    }

    /// Raw content as text, with invalid UTF-8 replaced
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

/// An entry of a note or attachment listing, or a search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExistingFile {
    /// Note title or attachment file name
    pub file_name: String,
    /// False for the "create this note" placeholder of a search
    pub exists: bool,
    /// Number of content lines matching a search; 0 for filename matches
    pub hits: usize,
}

impl ExistingFile {
    /// An entry that exists on disk
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            exists: true,
            hits: 0,
        }
    }

    /// A suggestion for a note that does not exist yet
    pub fn placeholder(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            exists: false,
            hits: 0,
        }
    }

    /// Copy of this entry carrying a content hit count
    pub fn with_hits(&self, hits: usize) -> Self {
        Self {
            file_name: self.file_name.clone(),
            exists: self.exists,
            hits,
        }
    }
}

/// Data behind a system-generated listing page (all files, search, attachments)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingView {
    /// Page heading
    pub title: String,
    /// Entries to show
    pub files: Vec<ExistingFile>,
    /// Always true; listings are never real notes
    pub special: bool,
    /// Query that produced the listing, empty when not a search
    pub search_criteria: String,
}

impl ListingView {
    /// Create a listing page
    pub fn new(
        title: impl Into<String>,
        files: Vec<ExistingFile>,
        search_criteria: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            files,
            special: true,
            search_criteria: search_criteria.into(),
        }
    }
}
