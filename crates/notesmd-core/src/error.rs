//! Note store error handling
//!
//! Provides typed errors for repository and attachment operations with
//! descriptive messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during note and attachment operations
#[derive(Error, Debug)]
pub enum NoteError {
    /// The note (or attachment) does not exist or cannot be read
    #[error("'{name}' not found at '{path}'")]
    NotFound {
        name: String,
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    /// Failed to create a directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to enumerate a directory
    #[error("Failed to list directory '{path}': {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write or remove a file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A name that would escape its directory
    #[error("Invalid file name '{name}': must not contain path separators or '..'")]
    InvalidName { name: String },
}

impl NoteError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, name: &str, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => NoteError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => NoteError::NotFound {
                name: name.to_string(),
                path,
                source: Some(error),
            },
            _ if is_disk_full_error(&error) => NoteError::DiskFull {
                path,
                source: error,
            },
            _ => NoteError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// A read failure of any kind, reported as not found
    pub fn not_found(error: io::Error, name: &str, path: PathBuf) -> Self {
        NoteError::NotFound {
            name: name.to_string(),
            path,
            source: Some(error),
        }
    }

    /// Whether this error means the note does not exist (and may be created)
    pub fn is_not_found(&self) -> bool {
        matches!(self, NoteError::NotFound { .. })
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NoteError::DiskFull { .. } | NoteError::PermissionDenied { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            NoteError::DiskFull { .. } => Some("Free up disk space and try again."),
            NoteError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            NoteError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            NoteError::InvalidName { .. } => Some("Use a plain file name without directories."),
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for note store operations
pub type NoteResult<T> = Result<T, NoteError>;
