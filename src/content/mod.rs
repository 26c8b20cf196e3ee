//! Content module - handles posts and content processing

mod date;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use date::parse_date;
pub use frontmatter::{FrontMatter, ParsedDocument};
pub use markdown::{MarkdownRenderer, Rendered};
pub use post::{parse_tags, Post, PostType};

pub(crate) use markdown::html_escape;
