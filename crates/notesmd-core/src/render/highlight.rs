//! Code block highlighting
//!
//! A block's syntax is chosen by a fixed fallback chain:
//! 1. the language tag from the fence info string
//! 2. a guess from a `LanguageDetector` looking at the block content
//! 3. plain text
//!
//! Tokenizing failures never abort a render: the block is emitted as an
//! escaped `<pre><code>` instead.

use std::sync::Arc;

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use tracing::{debug, warn};

use super::{escape_html, RenderError};

/// Guesses the language of an untagged code block
pub trait LanguageDetector: Send + Sync {
    /// Return a language token (extension or syntax name), if recognizable
    fn detect(&self, source: &str) -> Option<String>;
}

/// Detects languages from the first line (shebangs, `<?php`, `<?xml`, modelines)
pub struct FirstLineDetector {
    syntaxes: Arc<SyntaxSet>,
}

impl FirstLineDetector {
    pub fn new(syntaxes: Arc<SyntaxSet>) -> Self {
        Self { syntaxes }
    }
}

impl LanguageDetector for FirstLineDetector {
    fn detect(&self, source: &str) -> Option<String> {
        let first_line = source.lines().next()?;
        self.syntaxes
            .find_syntax_by_first_line(first_line)
            .map(|syntax| syntax.name.clone())
    }
}

/// Fragments that identify a language; every fragment of a rule must be present.
///
/// These are best-effort guesses for untagged blocks, checked in order. A
/// wrong guess only changes colors; tag the fence to be sure.
const HEURISTIC_RULES: &[(&[&str], &str)] = &[
    (&["fn ", "let "], "rs"),
    (&["package ", "func "], "go"),
    (&["def ", "):\n"], "py"),
    (&["public class ", "static void "], "java"),
    (&["#include <"], "c"),
    (&["function ", "const "], "js"),
    (&["SELECT ", " FROM "], "sql"),
    (&["<html", "</"], "html"),
    (&["apiVersion:", "kind:"], "yaml"),
];

/// Detects languages from characteristic fragments anywhere in the block
pub struct HeuristicDetector {
    rules: &'static [(&'static [&'static str], &'static str)],
}

impl Default for HeuristicDetector {
    fn default() -> Self {
        Self {
            rules: HEURISTIC_RULES,
        }
    }
}

impl LanguageDetector for HeuristicDetector {
    fn detect(&self, source: &str) -> Option<String> {
        self.rules
            .iter()
            .find(|(fragments, _)| fragments.iter().all(|f| source.contains(f)))
            .map(|(_, token)| token.to_string())
    }
}

/// Tries each detector in order, returning the first guess
pub struct ChainDetector {
    detectors: Vec<Box<dyn LanguageDetector>>,
}

impl ChainDetector {
    pub fn new(detectors: Vec<Box<dyn LanguageDetector>>) -> Self {
        Self { detectors }
    }
}

impl LanguageDetector for ChainDetector {
    fn detect(&self, source: &str) -> Option<String> {
        self.detectors.iter().find_map(|d| d.detect(source))
    }
}

/// Syntax highlighter for fenced code blocks
pub struct Highlighter {
    syntaxes: Arc<SyntaxSet>,
    theme: Theme,
    detector: Box<dyn LanguageDetector>,
}

impl Highlighter {
    /// Create a highlighter using the bundled theme `theme_name`
    ///
    /// Untagged blocks are detected by first line, then by heuristics.
    pub fn new(theme_name: &str) -> Result<Self, RenderError> {
        let syntaxes = Arc::new(SyntaxSet::load_defaults_newlines());
        let detector = ChainDetector::new(vec![
            Box::new(FirstLineDetector::new(Arc::clone(&syntaxes))),
            Box::new(HeuristicDetector::default()),
        ]);
        Self::with_detector(theme_name, syntaxes, Box::new(detector))
    }

    /// Create a highlighter with a custom language detector
    pub fn with_detector(
        theme_name: &str,
        syntaxes: Arc<SyntaxSet>,
        detector: Box<dyn LanguageDetector>,
    ) -> Result<Self, RenderError> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme_name)
            .ok_or_else(|| RenderError::UnknownTheme {
                name: theme_name.to_string(),
                available: Self::available_themes().join(", "),
            })?;

        Ok(Self {
            syntaxes,
            theme,
            detector,
        })
    }

    /// Names of the bundled themes
    pub fn available_themes() -> Vec<String> {
        ThemeSet::load_defaults().themes.into_keys().collect()
    }

    /// Pick the syntax for a block: tag, then detection, then plain text
    fn select_syntax(&self, lang: &str, source: &str) -> &SyntaxReference {
        if !lang.is_empty() {
            if let Some(syntax) = self.syntaxes.find_syntax_by_token(lang) {
                return syntax;
            }
            debug!("Unknown code block language '{}', guessing", lang);
        }

        self.detector
            .detect(source)
            .and_then(|token| self.syntaxes.find_syntax_by_token(&token))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    /// Highlight `source`, failing if the tokenizer does
    pub fn highlight(&self, lang: &str, source: &str) -> Result<String, RenderError> {
        let syntax = self.select_syntax(lang, source);
        highlighted_html_for_string(source, &self.syntaxes, syntax, &self.theme).map_err(
            |source| RenderError::Highlight {
                language: syntax.name.clone(),
                source,
            },
        )
    }

    /// Highlight `source`, falling back to an unhighlighted block on failure
    pub fn render_block(&self, lang: &str, source: &str) -> String {
        match self.highlight(lang, source) {
            Ok(html) => html,
            Err(e) => {
                warn!("{}; rendering block without highlighting", e);
                plain_block(source)
            }
        }
    }
}

/// An escaped, unhighlighted code block
pub fn plain_block(source: &str) -> String {
    format!("<pre><code>{}</code></pre>\n", escape_html(source))
}

/// Syntax set whose only grammar pushes a context that was never loaded
///
/// Highlighting any `broken` block containing `jump` fails inside syntect.
#[cfg(test)]
pub(crate) fn unresolved_syntaxes() -> Arc<SyntaxSet> {
    use syntect::parsing::{SyntaxDefinition, SyntaxSetBuilder};

    let broken = SyntaxDefinition::load_from_str(
        r#"
        name: Broken
        scope: source.broken
        file_extensions: [broken]
        contexts:
          main:
            - match: 'jump'
              push: scope:source.missing#main
        "#,
        true,
        None,
    )
    .unwrap();

    let mut builder = SyntaxSetBuilder::new();
    builder.add(broken);
    builder.add_plain_text_syntax();
    Arc::new(builder.build())
}
