//! Content loader - reads and parses posts from the input directory

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::Post;
use crate::error::Error;
use crate::tasks::join_keyed;
use crate::Site;

/// A markdown file found under the input directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path relative to the input directory
    pub path: PathBuf,
    pub full_path: PathBuf,
}

/// Posts that parsed, and the files that did not
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub posts: Vec<Post>,
    pub failures: Vec<(PathBuf, Error)>,
}

/// Loads posts from the input directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    exclude: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Result<Self> {
        let exclude = site
            .config
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("invalid exclude pattern {:?}", p)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { site, exclude })
    }

    /// Find every markdown file under the input directory, sorted by path
    pub fn discover(&self) -> Result<Vec<SourceFile>> {
        let source_dir = &self.site.source_dir;
        if !source_dir.is_dir() {
            anyhow::bail!("input directory {:?} does not exist", source_dir);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(source_dir).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }
            let relative = path.strip_prefix(source_dir).unwrap_or(path).to_path_buf();
            if self.exclude.iter().any(|p| p.matches_path(&relative)) {
                tracing::debug!("Excluded: {:?}", relative);
                continue;
            }
            files.push(SourceFile {
                path: relative,
                full_path: path.to_path_buf(),
            });
        }

        Ok(files)
    }

    /// Read all sources concurrently and build a post from each.
    ///
    /// A file that cannot be read or parsed is recorded in
    /// [`LoadOutcome::failures`] and does not affect the others.
    pub async fn load_posts(&self) -> Result<LoadOutcome> {
        let files = self.discover()?;
        let tz = self.site.timezone;

        let handles = files
            .into_iter()
            .map(|file| {
                let path = file.path.clone();
                let task = tokio::spawn(async move {
                    let text = tokio::fs::read_to_string(&file.full_path).await?;
                    Post::parse(&text, file.path, tz)
                });
                (path, task)
            })
            .collect();
        let results = join_keyed(handles).await;

        let mut outcome = LoadOutcome::default();
        for (path, result) in results {
            match result {
                Ok(post) => outcome.posts.push(post),
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", path, e);
                    outcome.failures.push((path, e));
                }
            }
        }

        tracing::debug!(
            "Loaded {} posts, {} failed",
            outcome.posts.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
