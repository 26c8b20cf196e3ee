//! List site content

use anyhow::Result;

use crate::collection::Collection;
use crate::content::loader::ContentLoader;
use crate::Site;

/// List site content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    let outcome = ContentLoader::new(site)?.load_posts().await?;
    for (path, error) in &outcome.failures {
        eprintln!("skipped {}: {}", path.display(), error);
    }
    let collection = Collection::new(outcome.posts)?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", collection.len());
            for post in collection.posts() {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source.display()
                );
            }
        }
        "tag" | "tags" => {
            let tags = collection.by_tag();
            println!("Tags ({}):", tags.len());
            for (tag, count) in sorted_by_count(tags.iter().map(|(k, v)| (*k, v.len()))) {
                println!("  {} ({})", tag, count);
            }
        }
        "category" | "categories" => {
            let categories = collection.by_category();
            println!("Categories ({}):", categories.len());
            for (category, count) in
                sorted_by_count(categories.iter().map(|(k, v)| (*k, v.len())))
            {
                println!("  {} ({})", category, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(())
}

/// Most used first; equal counts keep name order
fn sorted_by_count<'a>(terms: impl Iterator<Item = (&'a str, usize)>) -> Vec<(&'a str, usize)> {
    let mut terms: Vec<_> = terms.collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_count() {
        let terms = vec![("b", 1), ("a", 1), ("c", 3)];
        assert_eq!(
            sorted_by_count(terms.into_iter()),
            vec![("c", 3), ("a", 1), ("b", 1)]
        );
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("posts")).unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert!(run(&site, "pages").await.is_err());
        assert!(run(&site, "tags").await.is_ok());
    }
}
