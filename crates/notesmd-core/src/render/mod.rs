//! Markdown rendering pipeline
//!
//! Turns raw note bytes into HTML in two stages:
//!
//! - `markdown`: comrak parse + HTML output, with fenced code blocks handed
//!   to the `highlight` stage
//! - `links`: rewrites `{Note Title}` tokens in the finished HTML into links
//!   to the view route
//!
//! The syntax and theme tables are loaded once when the `Renderer` is built
//! and only read afterwards, so a single renderer can be shared across threads.

pub mod highlight;
pub mod links;
pub mod markdown;

use thiserror::Error;

pub use highlight::{
    ChainDetector, FirstLineDetector, HeuristicDetector, Highlighter, LanguageDetector,
};
pub use links::{resolve_links, VIEW_ROUTE};
pub use markdown::Renderer;

/// Escape `text` for use as HTML text content
pub fn escape_html(text: &str) -> String {
    let mut escaped = Vec::with_capacity(text.len());
    // Writing into a Vec cannot fail.
    let _ = comrak::html::escape(&mut escaped, text.as_bytes());
    String::from_utf8_lossy(&escaped).into_owned()
}

/// Errors raised while building or running the renderer
#[derive(Error, Debug)]
pub enum RenderError {
    /// The configured theme is not among the bundled themes
    #[error("Unknown highlight theme '{name}'. Available themes: {available}")]
    UnknownTheme { name: String, available: String },

    /// A code block could not be tokenized
    #[error("Failed to highlight code block as {language}: {source}")]
    Highlight {
        language: String,
        #[source]
        source: syntect::Error,
    },
}
