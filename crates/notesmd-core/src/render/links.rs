//! Inter-note links
//!
//! A note refers to another note by writing its title in braces, e.g.
//! `{Shopping List}`. After rendering, each such token becomes a link to the
//! view route. Targets are not checked; a link to a missing note is valid and
//! leads to its creation.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Route prefix under which notes are viewed
pub const VIEW_ROUTE: &str = "/view/";

static LINK_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z0-9\s]+)\}").expect("valid link token regex"));

/// Replace every `{Title}` token in `html` with a link to that note
///
/// Tokens are processed first to last; each distinct token text is replaced
/// everywhere it occurs, so repeated references all become links.
pub fn resolve_links(html: &str) -> String {
    let mut tokens: Vec<(&str, &str)> = Vec::new();
    for caps in LINK_TOKEN.captures_iter(html) {
        let (Some(token), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !tokens.iter().any(|(seen, _)| *seen == token.as_str()) {
            tokens.push((token.as_str(), title.as_str()));
        }
    }

    let mut resolved = html.to_string();
    for (token, title) in tokens {
        resolved = resolved.replace(token, &link_html(title));
    }
    resolved
}

/// Replace every `{Title}` token in plain `text` with the bare title
pub fn strip_link_tokens(text: &str) -> Cow<'_, str> {
    LINK_TOKEN.replace_all(text, "$1")
}

/// Anchor pointing at the view route of `title`
pub fn link_html(title: &str) -> String {
    format!("<a href=\"{}{}\">{}</a>", VIEW_ROUTE, title, title)
}
