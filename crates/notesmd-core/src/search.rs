//! Note search
//!
//! Two passes over the current note listing:
//!
//! 1. **Filename match**: case-insensitive substring of the title. A title
//!    equal to the query (ignoring case) is an exact match.
//! 2. **Content match**: only for titles that did not match and only for
//!    queries longer than `MIN_CONTENT_QUERY_LEN` bytes. Each line of the
//!    raw note containing the query (ignoring case) counts as one hit.
//!
//! A note appears at most once, and filename matches win. Results are
//! sorted by title. Nothing is cached; every search rescans the files.

use std::io::{self, BufRead, BufReader, Read};

use tracing::debug;

use crate::error::NoteResult;
use crate::models::{ExistingFile, ListingView};
use crate::repository::NoteRepository;

/// Queries of this many bytes or fewer only match titles
pub const MIN_CONTENT_QUERY_LEN: usize = 2;

/// Access to the raw content of notes by title
pub trait ContentSource {
    /// Open the raw markdown of `title` for reading
    fn open_content(&self, title: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// Search `notes` for `criteria`
///
/// Returns the matching entries sorted by title, and whether one of the
/// titles equals the query exactly (ignoring case).
pub fn search(
    notes: &[ExistingFile],
    criteria: &str,
    contents: &impl ContentSource,
) -> (Vec<ExistingFile>, bool) {
    let needle = criteria.to_lowercase();
    let scan_content = criteria.len() > MIN_CONTENT_QUERY_LEN;
    let mut found = Vec::new();
    let mut exact_match = false;

    for entry in notes {
        let title = entry.file_name.to_lowercase();
        if title.contains(&needle) {
            if title == needle {
                exact_match = true;
            }
            found.push(entry.clone());
        } else if scan_content {
            let hits = content_hits(contents, &entry.file_name, &needle);
            if hits > 0 {
                found.push(entry.with_hits(hits));
            }
        }
    }

    found.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    debug!(
        "Search for '{}' found {} note(s), exact match: {}",
        criteria,
        found.len(),
        exact_match
    );

    (found, exact_match)
}

/// Number of lines in `title` containing `needle`; 0 if it cannot be read
fn content_hits(contents: &impl ContentSource, title: &str, needle: &str) -> usize {
    match contents.open_content(title) {
        Ok(reader) => count_matching_lines(reader, needle).unwrap_or_else(|e| {
            debug!("Content scan of '{}' failed, counting no hits: {}", title, e);
            0
        }),
        Err(e) => {
            debug!("Could not open '{}' for content scan: {}", title, e);
            0
        }
    }
}

/// Count the lines of `reader` whose lowercase form contains `needle`
///
/// `needle` must already be lowercase. Invalid UTF-8 is replaced, not fatal.
pub fn count_matching_lines(reader: impl Read, needle: &str) -> io::Result<usize> {
    let mut hits = 0;
    for line in BufReader::new(reader).split(b'\n') {
        let line = line?;
        if String::from_utf8_lossy(&line).to_lowercase().contains(needle) {
            hits += 1;
        }
    }
    Ok(hits)
}

/// Run a search over the repository and shape it into a listing page
///
/// When no title equals the query, a non-existing entry named after the
/// query in title case is appended, offering to create that note.
pub fn search_view(repo: &NoteRepository, criteria: &str) -> NoteResult<ListingView> {
    let notes = repo.list()?;
    let (mut files, exact_match) = search(&notes, criteria, repo);

    if !exact_match && !criteria.trim().is_empty() {
        files.push(ExistingFile::placeholder(title_case(criteria)));
    }

    Ok(ListingView::new(
        format!("Files found with '{}'", criteria),
        files,
        criteria,
    ))
}

/// Upper-case the first letter of every word and lower-case the rest
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            result.push(c);
        } else if at_word_start {
            at_word_start = false;
            result.extend(c.to_uppercase());
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}
