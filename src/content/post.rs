//! Post model

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use super::date::parse_date;
use super::frontmatter::{FrontMatter, ParsedDocument};
use crate::error::{Error, Result};

/// Front-matter keys that map onto `Post` fields
const KNOWN_KEYS: [&str; 8] = [
    "title",
    "slug",
    "date",
    "tags",
    "category",
    "description",
    "link",
    "type",
];

/// Markers that end a post's teaser
const TEASER_MARKERS: [&str; 2] = ["<!-- TEASER_END -->", "<!-- more -->"];

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,

    /// URL-safe identifier, unique within a collection
    pub slug: String,

    pub date: DateTime<FixedOffset>,

    pub tags: BTreeSet<String>,

    pub category: Option<String>,

    pub description: Option<String>,

    /// External link for link posts
    pub link: Option<String>,

    #[serde(rename = "type")]
    pub post_type: PostType,

    /// Raw markdown body
    pub body: String,

    /// Source file path, relative to the input directory
    pub source: PathBuf,

    /// Front-matter fields with no dedicated attribute
    pub extra: IndexMap<String, String>,
}

/// Kind of post, from the `type` field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PostType {
    #[default]
    Text,
    Micro,
    Other(String),
}

impl PostType {
    pub fn as_str(&self) -> &str {
        match self {
            PostType::Text => "text",
            PostType::Micro => "micro",
            PostType::Other(s) => s,
        }
    }
}

impl From<&str> for PostType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => PostType::Text,
            "micro" => PostType::Micro,
            other => PostType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PostType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Post {
    /// Parse a source document and build a post from it
    pub fn parse(content: &str, source: impl Into<PathBuf>, tz: Tz) -> Result<Self> {
        let doc = FrontMatter::parse(content)?;
        Self::from_parsed(doc, source, tz)
    }

    /// Validate parsed front-matter and build a post
    pub fn from_parsed(doc: ParsedDocument<'_>, source: impl Into<PathBuf>, tz: Tz) -> Result<Self> {
        let fm = &doc.front_matter;

        let title = fm.require("title")?.to_string();
        let slug = normalize_slug(fm.require("slug")?)?;
        let date = parse_date(fm.get("date").unwrap_or_default(), tz)?;

        if doc.body.trim().is_empty() {
            return Err(Error::EmptyBody);
        }

        let extra = fm
            .iter()
            .filter(|(k, _)| !KNOWN_KEYS.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Ok(Self {
            title,
            slug,
            date,
            tags: parse_tags(fm.get("tags").unwrap_or_default()),
            category: non_empty(fm.get("category")),
            description: non_empty(fm.get("description")),
            link: non_empty(fm.get("link")),
            post_type: PostType::from(fm.get("type").unwrap_or_default()),
            body: doc.body.to_string(),
            source: source.into(),
            extra,
        })
    }

    /// Markdown before the first teaser marker, if the post has one
    pub fn teaser(&self) -> Option<&str> {
        TEASER_MARKERS
            .iter()
            .filter_map(|marker| self.body.find(marker))
            .min()
            .map(|pos| self.body[..pos].trim_end())
    }

    /// Rebuild the front-matter block this post would be written with
    pub fn front_matter(&self) -> FrontMatter {
        let mut fm = FrontMatter::new();
        let tags = self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        let date = self.date.format("%Y-%m-%d %H:%M:%S UTC%:z").to_string();
        let fields = [
            ("title", self.title.as_str()),
            ("slug", self.slug.as_str()),
            ("date", date.as_str()),
            ("tags", tags.as_str()),
            ("category", self.category.as_deref().unwrap_or_default()),
            ("link", self.link.as_deref().unwrap_or_default()),
            ("description", self.description.as_deref().unwrap_or_default()),
            ("type", self.post_type.as_str()),
        ];
        let extra = self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        for (key, value) in fields.into_iter().chain(extra) {
            // keys come from a parsed block or the constants above
            let _ = fm.insert(key, value);
        }
        fm
    }
}

/// Split a tag list on commas, or on whitespace when there is no comma
pub fn parse_tags(value: &str) -> BTreeSet<String> {
    let parts: Vec<&str> = if value.contains(',') {
        value.split(',').collect()
    } else {
        value.split_whitespace().collect()
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_slug(raw: &str) -> Result<String> {
    // `.` and `..` would resolve outside the post's own directory
    let is_url_safe = !raw.chars().all(|c| c == '.')
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if is_url_safe {
        return Ok(raw.to_string());
    }
    let slug = slug::slugify(raw);
    if slug.is_empty() {
        return Err(Error::MissingRequiredField("slug"));
    }
    tracing::warn!("slug {:?} is not URL-safe, using {:?}", raw, slug);
    Ok(slug)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
