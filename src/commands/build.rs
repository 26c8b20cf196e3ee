//! Build the static site

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collection::Collection;
use crate::content::loader::ContentLoader;
use crate::error::Error;
use crate::generator::{Generator, RenderedPage};
use crate::tasks::join_keyed;
use crate::Site;

/// Options for a build run
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Remove the output directory before writing
    pub clean: bool,
}

/// What happened to every post of a build
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Rendered posts as (source, slug)
    pub succeeded: Vec<(PathBuf, String)>,
    /// Posts that could not be parsed or rendered
    pub failed: Vec<(PathBuf, Error)>,
    /// Non-fatal [`Error::RenderDegraded`] warnings
    pub degraded: Vec<(PathBuf, Error)>,
    /// Error that stopped the build before anything was written
    pub fatal: Option<Error>,
    pub pages_written: usize,
}

impl BuildReport {
    /// Process exit status: 1 for a fatal error, 2 for failed posts in
    /// strict mode, 0 otherwise
    pub fn exit_code(&self, strict: bool) -> i32 {
        if self.fatal.is_some() {
            1
        } else if strict && !self.failed.is_empty() {
            2
        } else {
            0
        }
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Built {} posts, {} failed, {} pages written",
            self.succeeded.len(),
            self.failed.len(),
            self.pages_written
        )?;
        for (source, slug) in &self.succeeded {
            writeln!(f, "  ok       {} -> {}", source.display(), slug)?;
        }
        for (source, error) in &self.failed {
            writeln!(f, "  failed   {}: {}", source.display(), error)?;
        }
        for (source, warning) in &self.degraded {
            writeln!(f, "  warning  {}: {}", source.display(), warning)?;
        }
        if let Some(fatal) = &self.fatal {
            writeln!(f, "fatal: {}", fatal)?;
        }
        Ok(())
    }
}

/// Build the site: parse every post, render the post pages in parallel,
/// then render the listings once all posts are done.
///
/// Per-post problems end up in the report; an `Err` means the output could
/// not be written.
pub async fn run(site: &Site, options: BuildOptions) -> Result<BuildReport> {
    let start = std::time::Instant::now();
    let mut report = BuildReport::default();

    let loader = ContentLoader::new(site)?;
    let outcome = loader.load_posts().await?;
    report.failed = outcome.failures;

    tracing::info!(
        "Loaded {} posts ({} failed)",
        outcome.posts.len(),
        report.failed.len()
    );

    let collection = match Collection::new(outcome.posts) {
        Ok(collection) => Arc::new(collection),
        Err(e) => {
            tracing::error!("{}", e);
            report.fatal = Some(e);
            return Ok(report);
        }
    };

    if options.clean && site.output_dir.exists() {
        tokio::fs::remove_dir_all(&site.output_dir)
            .await
            .with_context(|| format!("failed to clean {:?}", site.output_dir))?;
        tracing::info!("Deleted: {:?}", site.output_dir);
    }
    tokio::fs::create_dir_all(&site.output_dir)
        .await
        .with_context(|| format!("failed to create {:?}", site.output_dir))?;

    let generator = Arc::new(Generator::new(site)?);

    let handles = (0..collection.len())
        .map(|index| {
            let generator = Arc::clone(&generator);
            let collection = Arc::clone(&collection);
            let task =
                tokio::task::spawn_blocking(move || generator.render_post(&collection, index));
            (index, task)
        })
        .collect();
    let rendered = join_keyed(handles).await;

    for (index, result) in rendered {
        let post = &collection.posts()[index];
        match result {
            Ok(page) => {
                write_page(&site.output_dir, &page).await?;
                report.pages_written += 1;
                for warning in page.warnings {
                    tracing::warn!("{:?}: {}", post.source, warning);
                    report
                        .degraded
                        .push((post.source.clone(), Error::RenderDegraded(warning)));
                }
                report.succeeded.push((post.source.clone(), post.slug.clone()));
            }
            Err(e) => {
                tracing::warn!("Failed to render {:?}: {}", post.source, e);
                report.failed.push((post.source.clone(), e));
            }
        }
    }

    // every post is rendered; listings can be built now
    let index_pages = {
        let generator = Arc::clone(&generator);
        let collection = Arc::clone(&collection);
        tokio::task::spawn_blocking(move || generator.render_indexes(&collection))
            .await
            .context("index task panicked")??
    };
    for page in &index_pages {
        write_page(&site.output_dir, page).await?;
        report.pages_written += 1;
    }

    report.succeeded.sort();
    report.failed.sort_by(|a, b| a.0.cmp(&b.0));

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} pages in {:.2}s",
        report.pages_written,
        duration.as_secs_f64()
    );

    Ok(report)
}

async fn write_page(output_dir: &Path, page: &RenderedPage) -> Result<()> {
    let output_path = output_dir.join(&page.path);
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&output_path, &page.contents)
        .await
        .with_context(|| format!("failed to write {:?}", output_path))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let mut report = BuildReport::default();
        assert_eq!(report.exit_code(true), 0);

        report
            .failed
            .push((PathBuf::from("a.md"), Error::MissingRequiredField("title")));
        assert_eq!(report.exit_code(false), 0);
        assert_eq!(report.exit_code(true), 2);

        report.fatal = Some(Error::DuplicateSlug {
            slug: "a".to_string(),
            first: PathBuf::from("a.md"),
            second: PathBuf::from("b.md"),
        });
        assert_eq!(report.exit_code(false), 1);
    }

    #[test]
    fn test_report_lists_failures() {
        let report = BuildReport {
            succeeded: vec![(PathBuf::from("good.md"), "good".to_string())],
            failed: vec![(PathBuf::from("bad.md"), Error::EmptyBody)],
            ..BuildReport::default()
        };
        let text = report.to_string();
        assert!(text.contains("Built 1 posts, 1 failed"));
        assert!(text.contains("good.md -> good"));
        assert!(text.contains("bad.md: post body is empty"));
    }
}
