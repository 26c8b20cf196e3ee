//! Error types for the content pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the pipeline [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing, validating and rendering posts
#[derive(Debug, Error)]
pub enum Error {
    /// A front-matter line does not follow the `.. key: value` grammar,
    /// or the block is never closed.
    #[error("malformed front-matter at line {line}: {message}")]
    MalformedFrontMatter { line: usize, message: String },

    /// `title`, `slug` or `date` is absent or empty
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// Two posts in one collection share a slug
    #[error("duplicate slug {slug:?} in {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Non-fatal: part of a post was rendered as literal text
    #[error("render degraded: {0}")]
    RenderDegraded(String),

    #[error("post body is empty")]
    EmptyBody,

    /// A key handed to [`FrontMatter::insert`](crate::content::FrontMatter::insert)
    /// that the block grammar cannot express
    #[error("invalid front-matter key {0:?}")]
    InvalidKey(String),

    /// A background task for one post panicked or was cancelled
    #[error("task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl Error {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedFrontMatter {
            line,
            message: message.into(),
        }
    }

    /// Whether this error stops the whole build rather than a single post
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::DuplicateSlug { .. })
    }
}
