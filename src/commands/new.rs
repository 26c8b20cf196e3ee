//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::FrontMatter;
use crate::Site;

/// Write a new post skeleton into the input directory
pub fn create_post(site: &Site, title: &str, tags: &str, category: Option<&str>) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("cannot derive a slug from title {:?}", title);
    }

    let now = chrono::Utc::now().with_timezone(&site.timezone);

    let mut front_matter = FrontMatter::new();
    front_matter.insert("title", title)?;
    front_matter.insert("slug", &slug)?;
    front_matter.insert("date", &now.format("%Y-%m-%d %H:%M:%S UTC%:z").to_string())?;
    front_matter.insert("tags", tags)?;
    front_matter.insert("category", category.unwrap_or_default())?;
    front_matter.insert("link", "")?;
    front_matter.insert("description", "")?;
    front_matter.insert("type", "text")?;

    fs::create_dir_all(&site.source_dir)?;
    let file_path = site.source_dir.join(format!("{}.md", slug));

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::write(&file_path, format!("{}\nWrite your post here.\n", front_matter))?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
