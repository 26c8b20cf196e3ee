//! Built-in page templates using the Tera template engine
//!
//! The templates are embedded in the binary; there is no theme directory.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tera::{Context, Tera};

use crate::error::Result;

/// Template renderer with the embedded default templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Values are escaped when the context data is built; rendered post
        // bodies and URLs are inserted as-is
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("default/layout.html")),
            ("post.html", include_str!("default/post.html")),
            ("index.html", include_str!("default/index.html")),
            ("listing.html", include_str!("default/listing.html")),
            ("terms.html", include_str!("default/terms.html")),
            ("archive.html", include_str!("default/archive.html")),
            // Partials
            (
                "partials/post_summary.html",
                include_str!("default/partials/post_summary.html"),
            ),
            (
                "partials/pager.html",
                include_str!("default/partials/pager.html"),
            ),
        ])?;

        // Register custom filters
        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Remove HTML tags, keeping the text between them
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Data structures for template context

/// Site-wide values available to every template as `config`
#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub feed_url: String,
    pub archive_url: String,
    pub tags_url: String,
    pub categories_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub date_iso: String,
    pub url: String,
    pub tags: Vec<LinkData>,
    pub category: Option<LinkData>,
    pub description: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "type")]
    pub post_type: String,
    pub content: String,
    pub extra: BTreeMap<String, String>,
}

/// A post as shown in listings
#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub title: String,
    pub url: String,
    pub date: String,
    pub date_iso: String,
    pub description: Option<String>,
    pub teaser: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkData {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total: usize,
    pub current: usize,
    pub prev_link: String,
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TermData {
    pub name: String,
    pub url: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveYearData {
    pub year: i32,
    pub posts: Vec<SummaryData>,
}
