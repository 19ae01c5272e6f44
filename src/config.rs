// src/config.rs
// =============================================================================
// Display and loading options shared by every embed in one run.
//
// Values come from four layers, later ones winning:
// 1. Built-in defaults (style "default", every toggle on)
// 2. An optional TOML file passed with --config
// 3. CLI flags
// 4. Parameters on the embed script's own URL (see resolve::target)
//
// Example config file:
//
//   style = "monokai"
//   show_border = false
//   asset_base = "https://cdn.example.com/highlight"
//   timeout_secs = 5
//   grammar = "https://example.com/syntaxes/Nix.sublime-syntax"
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_STYLE: &str = "default";
pub const DEFAULT_ASSET_BASE: &str = "/assets/highlight";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// Which syntax definitions the highlighter gets besides the bundled ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarSource {
    /// Only the syntaxes compiled into the binary
    Bundled,
    /// A .sublime-syntax file fetched over HTTP(S)
    Remote(String),
    /// A .sublime-syntax file, or a folder of them, on disk
    File(PathBuf),
}

impl GrammarSource {
    // Interprets a user-supplied location: URLs are remote, anything else is a path
    pub fn from_location(location: &str) -> Self {
        if location == "bundled" {
            GrammarSource::Bundled
        } else if location.starts_with("http://") || location.starts_with("https://") {
            GrammarSource::Remote(location.to_string())
        } else {
            GrammarSource::File(PathBuf::from(location))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// highlight.js theme name, e.g. "default", "monokai", "github-dark"
    pub style: String,
    pub show_border: bool,
    pub show_line_numbers: bool,
    pub show_file_meta: bool,
    /// Base URL the stylesheet links point at
    pub asset_base: String,
    /// Fetch timeout in seconds, 0 disables it
    pub timeout_secs: u64,
    /// "bundled", or a URL or path of extra .sublime-syntax definitions
    pub grammar: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            show_border: true,
            show_line_numbers: true,
            show_file_meta: true,
            asset_base: DEFAULT_ASSET_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            grammar: "bundled".to_string(),
        }
    }
}

impl EmbedConfig {
    // Loads a config file, falling back to defaults for missing keys
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: EmbedConfig = toml::from_str(text)?;
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn grammar_source(&self) -> GrammarSource {
        GrammarSource::from_location(&self.grammar)
    }

    // The two stylesheets every rendered document needs
    pub fn stylesheet_urls(&self) -> [String; 2] {
        let base = self.asset_base.trim_end_matches('/');
        [
            format!("{}/styles/{}.css", base, self.style),
            format!("{}/embed.css", base),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_turn_everything_on() {
        let config = EmbedConfig::default();
        assert_eq!(config.style, "default");
        assert!(config.show_border);
        assert!(config.show_line_numbers);
        assert!(config.show_file_meta);
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EmbedConfig::from_toml("style = \"monokai\"\nshow_border = false\n").unwrap();
        assert_eq!(config.style, "monokai");
        assert!(!config.show_border);
        assert!(config.show_file_meta);
        assert_eq!(config.asset_base, DEFAULT_ASSET_BASE);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = EmbedConfig::from_toml("timeout_secs = 0").unwrap();
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_unknown_toml_type_is_error() {
        assert!(EmbedConfig::from_toml("show_border = \"yes please\"").is_err());
    }

    #[test]
    fn test_grammar_source_from_location() {
        assert_eq!(GrammarSource::from_location("bundled"), GrammarSource::Bundled);
        assert_eq!(
            GrammarSource::from_location("https://example.com/Nix.sublime-syntax"),
            GrammarSource::Remote("https://example.com/Nix.sublime-syntax".to_string())
        );
        assert_eq!(
            GrammarSource::from_location("./syntaxes"),
            GrammarSource::File(PathBuf::from("./syntaxes"))
        );
    }

    #[test]
    fn test_stylesheet_urls() {
        let config = EmbedConfig {
            asset_base: "https://cdn.example.com/hl/".to_string(),
            style: "nord".to_string(),
            ..EmbedConfig::default()
        };
        assert_eq!(
            config.stylesheet_urls(),
            [
                "https://cdn.example.com/hl/styles/nord.css".to_string(),
                "https://cdn.example.com/hl/embed.css".to_string(),
            ]
        );
    }
}
