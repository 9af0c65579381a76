//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/notesmd/config.toml)
//! 3. Environment variables (NOTESMD_* prefix)
//!
//! Environment variables take precedence over config file values.
//! The loaded value is never mutated afterwards; every component borrows it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "NOTESMD";

/// Name of the attachments subdirectory inside the notes directory
pub const ATTACHMENTS_DIR: &str = "att";

/// Extension given to every note file
pub const NOTE_EXTENSION: &str = "md";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding the `<title>.md` files
    #[serde(default = "default_notes_dir")]
    pub notes_dir: PathBuf,

    /// Name of the syntax highlighting theme for code blocks
    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,

    /// Prepend a table of contents to rendered notes
    #[serde(default = "default_table_of_contents")]
    pub table_of_contents: bool,

    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            highlight_theme: default_highlight_theme(),
            table_of_contents: default_table_of_contents(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Create a configuration rooted at `notes_dir`, everything else default
    pub fn with_notes_dir(notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            notes_dir: notes_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (NOTESMD_NOTES_DIR, NOTESMD_HIGHLIGHT_THEME, ...)
    /// 2. Config file (~/.config/notesmd/config.toml or NOTESMD_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit config file path when given
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used. Nothing is created on
    /// disk; call `ensure_notes_dir` once every override is applied.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_NOTES_DIR", ENV_PREFIX)) {
            if !val.is_empty() {
                self.notes_dir = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var(format!("{}_HIGHLIGHT_THEME", ENV_PREFIX)) {
            if !val.is_empty() {
                self.highlight_theme = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_TOC", ENV_PREFIX)) {
            self.table_of_contents = val.eq_ignore_ascii_case("true") || val == "1";
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_LEVEL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.log_level = val;
            }
        }
    }

    /// Ensure the notes directory exists
    pub fn ensure_notes_dir(&self) -> Result<()> {
        if !self.notes_dir.exists() {
            std::fs::create_dir_all(&self.notes_dir).with_context(|| {
                format!("Failed to create notes directory: {:?}", self.notes_dir)
            })?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with NOTESMD_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notesmd")
            .join("config.toml")
    }

    /// Directory holding uploaded attachments
    pub fn attachments_dir(&self) -> PathBuf {
        self.notes_dir.join(ATTACHMENTS_DIR)
    }

    /// Path of the file backing the note `title`
    pub fn note_path(&self, title: &str) -> PathBuf {
        self.notes_dir.join(format!("{}.{}", title, NOTE_EXTENSION))
    }
}

/// Get the default notes directory
fn default_notes_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notesmd")
        .join("notes")
}

fn default_highlight_theme() -> String {
    "base16-ocean.dark".to_string()
}

fn default_table_of_contents() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "NOTESMD_NOTES_DIR",
        "NOTESMD_HIGHLIGHT_THEME",
        "NOTESMD_TOC",
        "NOTESMD_LOG_LEVEL",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.highlight_theme, "base16-ocean.dark");
        assert!(config.table_of_contents);
        assert_eq!(config.log_level, "warn");
        assert!(config.notes_dir.ends_with("notes"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::with_notes_dir("/data/notes");

        assert_eq!(config.attachments_dir(), PathBuf::from("/data/notes/att"));
        assert_eq!(
            config.note_path("Shopping List"),
            PathBuf::from("/data/notes/Shopping List.md")
        );
    }

    #[test]
    fn test_env_override_notes_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("NOTESMD_NOTES_DIR", "/tmp/notesmd-test");
        config.apply_env_overrides();

        assert_eq!(config.notes_dir, PathBuf::from("/tmp/notesmd-test"));
    }

    #[test]
    fn test_env_override_toc() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.table_of_contents);

        env::set_var("NOTESMD_TOC", "false");
        config.apply_env_overrides();
        assert!(!config.table_of_contents);

        env::set_var("NOTESMD_TOC", "1");
        config.apply_env_overrides();
        assert!(config.table_of_contents);
    }

    #[test]
    fn test_env_override_theme_ignores_empty() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("NOTESMD_HIGHLIGHT_THEME", "");
        config.apply_env_overrides();
        assert_eq!(config.highlight_theme, "base16-ocean.dark");

        env::set_var("NOTESMD_HIGHLIGHT_THEME", "InspiredGitHub");
        config.apply_env_overrides();
        assert_eq!(config.highlight_theme, "InspiredGitHub");
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            notes_dir = "/custom/notes"
            highlight_theme = "Solarized (dark)"
            table_of_contents = false
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.notes_dir, PathBuf::from("/custom/notes"));
        assert_eq!(config.highlight_theme, "Solarized (dark)");
        assert!(!config.table_of_contents);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_load_from_path_creates_nothing() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let notes_dir = temp_dir.path().join("notes");

        env::set_var("NOTESMD_NOTES_DIR", &notes_dir);
        let config = Config::load_from_path(&temp_dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.notes_dir, notes_dir);
        assert!(!notes_dir.exists());

        config.ensure_notes_dir().unwrap();
        assert!(notes_dir.is_dir());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("config.toml");

        let mut config = Config::with_notes_dir(temp_dir.path().join("notes"));
        config.highlight_theme = "InspiredGitHub".to_string();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
