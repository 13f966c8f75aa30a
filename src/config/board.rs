//! Board configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::MalformedPolicy;
use crate::i18n::Locale;

/// Main board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    // Page
    /// Page heading; the locale's default when unset
    pub title: Option<String>,
    pub language: Locale,
    /// IANA zone used to read dates without an offset and to display dates
    pub timezone: String,

    // Directory
    pub notices_dir: String,
    pub public_dir: String,
    pub dist_dir: String,
    /// File extensions recognized as notices
    pub extensions: Vec<String>,

    // Rendering
    /// Custom Tera page template, relative to the base directory
    pub template: Option<String>,
    /// Stylesheet in `public_dir` linked from the page and copied on build
    pub stylesheet: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Defaults
    pub default_title: Option<String>,
    pub default_author: Option<String>,
    /// Date given to notices without one instead of the current time
    pub fallback_date: Option<String>,
    pub on_malformed: MalformedPolicy,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            title: None,
            language: Locale::default(),
            timezone: "Asia/Seoul".to_string(),

            notices_dir: "notices".to_string(),
            public_dir: "public".to_string(),
            dist_dir: "dist".to_string(),
            extensions: vec!["md".to_string()],

            template: None,
            stylesheet: "tailwind.css".to_string(),
            highlight: HighlightConfig::default(),

            default_title: None,
            default_author: None,
            fallback_date: None,
            on_malformed: MalformedPolicy::default(),

            server: ServerConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        // An empty file is a valid, all-default configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: BoardConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Heading of the notice page
    pub fn page_title(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or_else(|| self.language.page_title())
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Interactive server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BoardConfig::default();
        assert_eq!(config.notices_dir, "notices");
        assert_eq!(config.dist_dir, "dist");
        assert_eq!(config.language, Locale::Ko);
        assert_eq!(config.on_malformed, MalformedPolicy::Abort);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.page_title(), "공지사항");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Service status
language: en
timezone: UTC
default_author: Ops team
on_malformed: skip
highlight:
  enable: false
server:
  port: 8080
"#;
        let config: BoardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.page_title(), "Service status");
        assert_eq!(config.language, Locale::En);
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.default_author.as_deref(), Some("Ops team"));
        assert_eq!(config.on_malformed, MalformedPolicy::Skip);
        assert!(!config.highlight.enable);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.ip, "localhost");
        assert_eq!(config.extensions, vec!["md"]);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "server: [unclosed\n").unwrap();

        let err = BoardConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("_config.yml"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(serde_yaml::from_str::<BoardConfig>("on_malformed: maybe").is_err());
    }
}
