//! Markdown to HTML
//!
//! Parses with comrak (tables, definition lists, footnotes, task lists,
//! strikethrough, autolinks, heading ids), then replaces every code block
//! node with the output of the `Highlighter` before formatting.

use std::sync::LazyLock;

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{format_html, parse_document, Anchorizer, Arena, Options};
use regex::Regex;
use tracing::warn;

use super::highlight::Highlighter;
use super::links::strip_link_tokens;
use super::{escape_html, RenderError};
use crate::config::Config;

static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="((?:https?|ftp)://[^"]*)""#).expect("valid external link regex")
});

/// Markdown renderer with code highlighting
pub struct Renderer {
    highlighter: Highlighter,
    table_of_contents: bool,
}

/// A heading collected for the table of contents
struct TocEntry {
    level: u8,
    id: String,
    text: String,
}

impl Renderer {
    /// Build the renderer described by `config`
    ///
    /// Fails when the configured highlight theme does not exist.
    pub fn new(config: &Config) -> Result<Self, RenderError> {
        let highlighter = Highlighter::new(&config.highlight_theme)?;
        Ok(Self::with_highlighter(highlighter, config.table_of_contents))
    }

    /// Build a renderer around an existing highlighter
    pub fn with_highlighter(highlighter: Highlighter, table_of_contents: bool) -> Self {
        Self {
            highlighter,
            table_of_contents,
        }
    }

    /// Render raw markdown bytes to HTML
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Inter-note links are
    /// not resolved here; see `resolve_links`.
    pub fn render(&self, raw: &[u8]) -> String {
        let text = String::from_utf8_lossy(raw);

        let mut options = Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.description_lists = true;
        options.extension.header_ids = Some(String::new());
        // Highlighted blocks are injected as raw HTML.
        options.render.unsafe_ = true;

        let arena = Arena::new();
        let root = parse_document(&arena, &text, &options);

        self.highlight_code_blocks(root);

        let mut html: Vec<u8> = Vec::new();
        if let Err(e) = format_html(root, &options, &mut html) {
            warn!("Failed to format rendered markdown: {}", e);
        }
        let body = harden_external_links(&String::from_utf8_lossy(&html));

        if self.table_of_contents {
            let toc = table_of_contents(root);
            if !toc.is_empty() {
                return format!("{}{}", toc, body);
            }
        }
        body
    }

    fn highlight_code_blocks<'a>(&self, root: &'a AstNode<'a>) {
        for node in root.descendants() {
            let highlighted = match node.data.borrow().value {
                NodeValue::CodeBlock(ref block) => {
                    let lang = block.info.split_whitespace().next().unwrap_or("");
                    Some(self.highlighter.render_block(lang, &block.literal))
                }
                _ => None,
            };

            if let Some(literal) = highlighted {
                node.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
                    block_type: 0,
                    literal,
                });
            }
        }
    }
}

/// Open absolute links in a new browsing context
fn harden_external_links(html: &str) -> String {
    EXTERNAL_LINK
        .replace_all(html, r#"<a href="$1" target="_blank" rel="noopener""#)
        .into_owned()
}

/// Build a `<nav class="toc">` listing every heading, or "" when there are none
///
/// Ids come from a fresh `Anchorizer` walking headings in document order,
/// which reproduces the ids comrak assigns while formatting. Entry text keeps
/// no `{Title}` tokens, since each entry is already a link.
fn table_of_contents<'a>(root: &'a AstNode<'a>) -> String {
    let mut anchorizer = Anchorizer::new();
    let mut entries = Vec::new();

    for node in root.descendants() {
        let level = match node.data.borrow().value {
            NodeValue::Heading(ref heading) => heading.level,
            _ => continue,
        };
        let text = heading_text(node);
        entries.push(TocEntry {
            level,
            id: anchorizer.anchorize(text.clone()),
            text,
        });
    }

    if entries.is_empty() {
        return String::new();
    }

    let mut toc = String::from("<nav class=\"toc\">\n<ul>\n");
    for entry in &entries {
        toc.push_str(&format!(
            "<li class=\"toc-h{}\"><a href=\"#{}\">{}</a></li>\n",
            entry.level,
            escape_html(&entry.id),
            escape_html(&strip_link_tokens(&entry.text))
        ));
    }
    toc.push_str("</ul>\n</nav>\n");
    toc
}

fn heading_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.descendants() {
        match child.data.borrow().value {
            NodeValue::Text(ref literal) => text.push_str(literal),
            NodeValue::Code(ref code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::highlight::{unresolved_syntaxes, HeuristicDetector};
    use crate::render::resolve_links;

    fn renderer(toc: bool) -> Renderer {
        let highlighter = Highlighter::new("base16-ocean.dark").unwrap();
        Renderer::with_highlighter(highlighter, toc)
    }

    #[test]
    fn test_basic_markdown() {
        let html = renderer(false).render(b"# Title\n\nSome *emphasis* here.\n\n- one\n- two\n");
        assert!(html.contains("<h1>"));
        assert!(html.contains("id=\"title\""));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn test_tables_and_definition_lists() {
        let md = b"| a | b |\n|---|---|\n| 1 | 2 |\n\nTerm\n\n: Definition\n";
        let html = renderer(false).render(md);
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<dl>"));
        assert!(html.contains("<dt>Term</dt>"));
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let html = renderer(false).render(b"```rust\nfn main() {}\n```\n");
        assert!(html.contains("<pre style="));
        assert!(!html.contains("<code class=\"language-rust\">"));
    }

    #[test]
    fn test_untagged_code_still_renders() {
        let html = renderer(false).render(b"```\nno idea what this is\n```\n");
        assert!(html.contains("<pre"));
        assert!(html.contains("no idea what this is"));
    }

    #[test]
    fn test_external_links_open_in_new_context() {
        let html = renderer(false).render(b"[rust](https://www.rust-lang.org) and [local](/view/Index)");
        assert!(html.contains(
            "<a href=\"https://www.rust-lang.org\" target=\"_blank\" rel=\"noopener\">"
        ));
        assert!(html.contains("<a href=\"/view/Index\">"));
    }

    #[test]
    fn test_table_of_contents() {
        let html = renderer(true).render(b"# First\n\n## Second Part\n\ntext\n");
        assert!(html.starts_with("<nav class=\"toc\">"));
        assert!(html.contains("<li class=\"toc-h1\"><a href=\"#first\">First</a></li>"));
        assert!(html.contains("<a href=\"#second-part\">Second Part</a>"));
    }

    #[test]
    fn test_toc_entries_never_nest_note_links() {
        let html = resolve_links(&renderer(true).render(b"# Call {Mom}\n\ntext\n"));

        let nav_end = html.find("</nav>").unwrap();
        let (nav, body) = html.split_at(nav_end);
        assert_eq!(nav.matches("<a ").count(), 1);
        assert!(nav.contains("<a href=\"#call-mom\">Call Mom</a>"));
        assert!(body.contains("<a href=\"/view/Mom\">Mom</a>"));
    }

    #[test]
    fn test_highlight_failure_renders_plain_block() {
        let highlighter = Highlighter::with_detector(
            "base16-ocean.dark",
            unresolved_syntaxes(),
            Box::new(HeuristicDetector::default()),
        )
        .unwrap();
        let renderer = Renderer::with_highlighter(highlighter, false);

        let html = renderer.render(b"before\n\n```broken\njump & run\n```\n\nafter\n");
        assert!(html.contains("<pre><code>jump &amp; run\n</code></pre>"));
        assert!(html.contains("<p>before</p>"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_no_toc_without_headings() {
        let html = renderer(true).render(b"just a paragraph\n");
        assert!(!html.contains("toc"));
    }

    #[test]
    fn test_invalid_utf8_is_rendered_lossily() {
        let html = renderer(false).render(&[b'h', b'i', 0xff, b'\n']);
        assert!(html.contains("hi\u{fffd}"));
    }

    #[test]
    fn test_render_is_repeatable() {
        let r = renderer(true);
        let md = b"# Same\n\n# Same\n";
        assert_eq!(r.render(md), r.render(md));
    }
}
