//! nikola-rs: a static site generator for Nikola-style Markdown posts
//!
//! Posts carry a `.. key: value` front-matter block in an HTML comment.
//! A build parses every post, validates the collection, renders one page per
//! post and then the aggregate listings (index, archive, tags, categories).

pub mod collection;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod tasks;
pub mod templates;

pub use error::{Error, Result};

use chrono_tz::Tz;
use std::path::{Path, PathBuf};

/// A site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the markdown posts
    pub source_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
    /// Zone for timestamps written without an offset
    pub timezone: Tz,
}

impl Site {
    /// Create a new site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Self::from_config(base_dir, config)
    }

    fn from_config(base_dir: PathBuf, config: config::SiteConfig) -> anyhow::Result<Self> {
        let source_dir = base_dir.join(&config.posts_dir);
        let output_dir = base_dir.join(&config.output_dir);
        let timezone = config.tz()?;

        Ok(Self {
            config,
            base_dir,
            source_dir,
            output_dir,
            timezone,
        })
    }

    /// Override the input and output directories; relative paths are
    /// resolved against the base directory
    pub fn with_dirs(mut self, input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        if let Some(input) = input {
            self.source_dir = self.base_dir.join(input);
        }
        if let Some(output) = output {
            self.output_dir = self.base_dir.join(output);
        }
        self
    }
}

impl Default for Site {
    fn default() -> Self {
        let config = config::SiteConfig::default();
        Self {
            source_dir: PathBuf::from(&config.posts_dir),
            output_dir: PathBuf::from(&config.output_dir),
            base_dir: PathBuf::new(),
            timezone: Tz::UTC,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.source_dir, dir.path().join("posts"));
        assert_eq!(site.output_dir, dir.path().join("output"));
        assert_eq!(site.timezone, Tz::UTC);
    }

    #[test]
    fn test_with_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("elsewhere");
        let site = Site::new(dir.path())
            .unwrap()
            .with_dirs(Some(PathBuf::from("content")), Some(absolute.clone()));
        assert_eq!(site.source_dir, dir.path().join("content"));
        assert_eq!(site.output_dir, absolute);
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "title: Notes\nposts_dir: src\ntimezone: Europe/Berlin\n",
        )
        .unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "Notes");
        assert_eq!(site.source_dir, dir.path().join("src"));
        assert_eq!(site.timezone, chrono_tz::Europe::Berlin);
    }
}
