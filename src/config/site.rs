//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// IANA zone used for timestamps written without an offset
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub posts_dir: String,
    pub output_dir: String,
    pub post_dir: String,
    pub tag_dir: String,
    pub category_dir: String,
    pub archive_dir: String,
    /// Glob patterns (relative to `posts_dir`) that are never loaded
    #[serde(default)]
    pub exclude: Vec<String>,

    // Writing
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Listing
    pub per_page: usize,
    pub date_format: String,

    #[serde(default)]
    pub feed: FeedConfig,
    pub search_index: bool,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            timezone: "UTC".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            posts_dir: "posts".to_string(),
            output_dir: "output".to_string(),
            post_dir: "posts".to_string(),
            tag_dir: "tags".to_string(),
            category_dir: "categories".to_string(),
            archive_dir: "archive".to_string(),
            exclude: Vec::new(),

            highlight: HighlightConfig::default(),

            per_page: 10,
            date_format: "%Y-%m-%d %H:%M".to_string(),

            feed: FeedConfig::default(),
            search_index: true,

            extra: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.per_page == 0 {
            anyhow::bail!("per_page must be greater than zero");
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!("invalid date_format {:?}", self.date_format);
        }
        Ok(())
    }

    /// The configured timezone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {}", self.timezone, e))
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
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

/// Atom feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub enable: bool,
    pub path: String,
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: true,
            path: "atom.xml".to_string(),
            limit: 20,
        }
    }
}
