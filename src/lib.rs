//! noticeboard: publish a directory of markdown notices
//!
//! Notices are markdown files with a YAML front-matter header. They are
//! served live as an HTML page with a JSON API, or built once into a static
//! `index.html` and `notices.json` bundle.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod i18n;
pub mod server;
pub mod templates;

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use std::path::{Component, Path, PathBuf};

pub use error::NoticeError;

/// The main noticeboard application
#[derive(Debug, Clone)]
pub struct Noticeboard {
    /// Board configuration
    pub config: config::BoardConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the notice files
    pub notices_dir: PathBuf,
    /// Static assets served alongside the page
    pub public_dir: PathBuf,
    /// Output directory of the static build
    pub dist_dir: PathBuf,
    /// Zone dates are read and displayed in
    pub timezone: Tz,
    /// Pinned default date, parsed from `fallback_date`
    fallback_date: Option<DateTime<FixedOffset>>,
}

impl Noticeboard {
    /// Create a new board from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::BoardConfig::load(&config_path)?
        } else {
            config::BoardConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Create a board from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::BoardConfig) -> Result<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", config.timezone, e))?;

        let fallback_date = config
            .fallback_date
            .as_deref()
            .map(|s| {
                content::parse_date(s, &timezone)
                    .ok_or_else(|| anyhow!("Invalid fallback_date {:?}", s))
            })
            .transpose()?;

        // The stylesheet is copied into the dist dir and must stay inside it
        let stylesheet = Path::new(&config.stylesheet);
        if stylesheet.as_os_str().is_empty()
            || !stylesheet
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(anyhow!(
                "Invalid stylesheet {:?}: expected a relative path without '..'",
                config.stylesheet
            ));
        }

        let notices_dir = base_dir.join(&config.notices_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let dist_dir = base_dir.join(&config.dist_dir);

        Ok(Self {
            config,
            base_dir,
            notices_dir,
            public_dir,
            dist_dir,
            timezone,
            fallback_date,
        })
    }

    /// Date given to notices that do not set one: the pinned `fallback_date`,
    /// or the current time in the board's zone
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.fallback_date
            .unwrap_or_else(|| Utc::now().with_timezone(&self.timezone).fixed_offset())
    }

    /// Path of the configured custom page template, if any
    pub fn template_path(&self) -> Option<PathBuf> {
        self.config.template.as_ref().map(|t| self.base_dir.join(t))
    }

    /// Build the static bundle
    pub async fn build(&self) -> Result<commands::build::BuildReport> {
        commands::build::run(self).await
    }

    /// Remove the static bundle
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_new_without_config() {
        let dir = TempDir::new().unwrap();
        let board = Noticeboard::new(dir.path()).unwrap();
        assert_eq!(board.notices_dir, dir.path().join("notices"));
        assert_eq!(board.dist_dir, dir.path().join("dist"));
        assert_eq!(board.timezone, chrono_tz::Asia::Seoul);
        assert!(board.template_path().is_none());
    }

    #[test]
    fn test_fallback_date_pins_now() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "timezone: UTC\nfallback_date: 2024-02-03\n",
        )
        .unwrap();
        let board = Noticeboard::new(dir.path()).unwrap();
        assert_eq!(board.now().to_rfc3339(), "2024-02-03T00:00:00+00:00");
        assert_eq!(board.now(), board.now());
    }

    #[test]
    fn test_stylesheet_must_stay_in_dist() {
        for stylesheet in ["../x.css", "/etc/x.css", "css/../../x.css"] {
            let config = config::BoardConfig {
                stylesheet: stylesheet.to_string(),
                ..Default::default()
            };
            let err = Noticeboard::with_config(PathBuf::from("."), config).unwrap_err();
            assert!(err.to_string().contains("Invalid stylesheet"), "{}", stylesheet);
        }

        let config = config::BoardConfig {
            stylesheet: "css/site.css".to_string(),
            ..Default::default()
        };
        assert!(Noticeboard::with_config(PathBuf::from("."), config).is_ok());
    }

    #[test]
    fn test_invalid_timezone_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "timezone: Mars/Olympus\n").unwrap();
        assert!(Noticeboard::new(dir.path()).is_err());
    }
}
