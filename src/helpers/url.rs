//! URL helper functions
//!
//! Paths returned by the `*_path` helpers are relative to the output
//! directory and end with `/`; the page itself is `index.html` inside.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/tags/js/") // -> "/blog/tags/js/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Output path of a post page
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    format!("{}/{}/", config.post_dir.trim_matches('/'), slug)
}

/// Output path of a tag listing
pub fn tag_path(config: &SiteConfig, tag: &str) -> String {
    format!("{}/{}/", config.tag_dir.trim_matches('/'), term_slug(tag))
}

/// Output path of a category listing
pub fn category_path(config: &SiteConfig, category: &str) -> String {
    format!("{}/{}/", config.category_dir.trim_matches('/'), term_slug(category))
}

/// URL-safe form of a tag or category name
pub fn term_slug(name: &str) -> String {
    let slug = slug::slugify(name);
    if slug.is_empty() {
        encode_url(name)
    } else {
        slug
    }
}

/// Encode a URL path segment
pub fn encode_url(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/posts/x/"), "/blog/posts/x/");
        assert_eq!(url_for(&config, ""), "/blog/");
        assert_eq!(url_for(&SiteConfig::default(), "tags/"), "/tags/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about/"),
            "https://example.com/blog/about/"
        );
    }

    #[test]
    fn test_taxonomy_paths() {
        let config = SiteConfig::default();
        assert_eq!(post_path(&config, "promises"), "posts/promises/");
        assert_eq!(tag_path(&config, "Web Dev"), "tags/web-dev/");
        assert_eq!(category_path(&config, "JavaScript"), "categories/javascript/");
    }

    #[test]
    fn test_term_slug_falls_back_to_encoding() {
        assert_eq!(term_slug("!!"), "%21%21");
    }
}
