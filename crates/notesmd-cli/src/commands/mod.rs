//! Command handlers

pub mod attachment;
pub mod config;
pub mod note;
pub mod search;

use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;

static VALID_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s]+$").expect("valid title regex"));

/// Accept only titles made of letters, digits and whitespace
///
/// The repository itself takes any title; this keeps titles safe to use as
/// file names and as `{Title}` link targets.
pub fn validate_title(title: &str) -> Result<&str> {
    if !VALID_TITLE.is_match(title) {
        bail!(
            "Invalid title '{}': use only letters, digits and spaces",
            title
        );
    }
    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Index").is_ok());
        assert!(validate_title("Shopping List 2").is_ok());

        assert!(validate_title("").is_err());
        assert!(validate_title("../etc").is_err());
        assert!(validate_title("a.b").is_err());
        assert!(validate_title("x/y").is_err());
    }
}
