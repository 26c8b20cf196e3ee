//! Front-matter parsing
//!
//! Posts start with a metadata block of `.. key: value` lines wrapped in an
//! HTML comment:
//!
//! ```text
//! <!--
//! .. title: Promises, explained
//! .. slug: promises-explained
//! .. date: 2024-01-31 14:09:07 UTC+05:30
//! .. tags: javascript, async
//! -->
//! ```
//!
//! A `---` / `---` fence around the same lines is accepted as well.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

lazy_static! {
    static ref FIELD_LINE: Regex =
        Regex::new(r"^\.\.\s+([A-Za-z0-9_-]+):(?:\s+(.*?))?\s*$").expect("valid field regex");
    static ref FIELD_KEY: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid key regex");
}

/// Opening and closing markers of a front-matter block
const MARKERS: [(&str, &str); 2] = [("<!--", "-->"), ("---", "---")];

/// Key/value metadata from the head of a post, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrontMatter {
    fields: IndexMap<String, String>,
}

/// Result of splitting a document into metadata and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument<'a> {
    pub front_matter: FrontMatter,
    pub body: &'a str,
    /// Byte offset of `body` within the parsed text
    pub body_offset: usize,
    /// 1-based line number where `body` starts
    pub body_line: usize,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document and require the `title` and `slug` fields
    pub fn parse(content: &str) -> Result<ParsedDocument<'_>> {
        let doc = Self::extract(content)?;
        doc.front_matter.require("title")?;
        doc.front_matter.require("slug")?;
        Ok(doc)
    }

    /// Split a document into its front-matter block and body without
    /// checking which fields are present.
    ///
    /// A document whose first non-blank line is not an opening marker has no
    /// front-matter; its whole text is the body.
    pub fn extract(content: &str) -> Result<ParsedDocument<'_>> {
        let mut lines = Lines::new(content).peekable();

        while lines.next_if(|l| l.text.trim().is_empty()).is_some() {}

        let Some(opening) = lines.next() else {
            return Ok(ParsedDocument::without_front_matter(content));
        };
        let Some(&(_, closing)) = MARKERS
            .iter()
            .find(|(open, _)| opening.text.trim_end() == *open)
        else {
            return Ok(ParsedDocument::without_front_matter(content));
        };

        let mut front_matter = FrontMatter::new();
        let mut closed = false;

        for line in lines.by_ref() {
            let text = line.text.trim();
            if text == closing {
                closed = true;
                break;
            }
            if text.is_empty() {
                continue;
            }
            let caps = FIELD_LINE.captures(text).ok_or_else(|| {
                Error::malformed(line.number, format!("expected `.. key: value`, got {:?}", text))
            })?;
            let value = caps.get(2).map_or("", |m| m.as_str());
            if front_matter.fields.contains_key(&caps[1].to_ascii_lowercase()) {
                tracing::debug!("front-matter key {:?} repeated, keeping the last value", &caps[1]);
            }
            front_matter
                .fields
                .insert(caps[1].to_ascii_lowercase(), value.to_string());
        }

        if !closed {
            return Err(Error::malformed(
                opening.number,
                format!("block opened with {:?} is never closed", opening.text.trim()),
            ));
        }

        while lines.next_if(|l| l.text.trim().is_empty()).is_some() {}

        let (body_offset, body_line) = match lines.peek() {
            Some(line) => (line.offset, line.number),
            None => (content.len(), content.lines().count() + 1),
        };

        Ok(ParsedDocument {
            front_matter,
            body: &content[body_offset..],
            body_offset,
            body_line,
        })
    }

    /// Get a field's value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Get a field that must be present and non-empty
    pub fn require(&self, key: &'static str) -> Result<&str> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::MissingRequiredField(key)),
        }
    }

    /// Set a field, replacing any previous value.
    ///
    /// Line breaks in the value are folded into spaces so the field survives
    /// serialization.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        if !FIELD_KEY.is_match(key) {
            return Err(Error::InvalidKey(key.to_string()));
        }
        let value = value.replace(['\r', '\n'], " ");
        self.fields
            .insert(key.to_ascii_lowercase(), value.trim().to_string());
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for FrontMatter {
    /// Serialize as a canonical `<!-- ... -->` block
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!--")?;
        for (key, value) in &self.fields {
            if value.is_empty() {
                writeln!(f, ".. {}:", key)?;
            } else {
                writeln!(f, ".. {}: {}", key, value)?;
            }
        }
        writeln!(f, "-->")
    }
}

impl<'a> ParsedDocument<'a> {
    fn without_front_matter(content: &'a str) -> Self {
        Self {
            front_matter: FrontMatter::new(),
            body: content,
            body_offset: 0,
            body_line: 1,
        }
    }
}

/// A line of input with its position
struct Line<'a> {
    text: &'a str,
    offset: usize,
    number: usize,
}

/// Iterator over lines that tracks byte offsets and line numbers
struct Lines<'a> {
    content: &'a str,
    offset: usize,
    number: usize,
}

impl<'a> Lines<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            offset: 0,
            number: 0,
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.content.len() {
            return None;
        }
        let rest = &self.content[self.offset..];
        let len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let line = Line {
            text: rest[..len].trim_end_matches(['\n', '\r']),
            offset: self.offset,
            number: self.number + 1,
        };
        self.offset += len;
        self.number += 1;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = "<!--
.. title: Promises, explained
.. slug: promises-explained
.. date: 2024-01-31 14:09:07 UTC+05:30
.. tags: javascript, async
.. category:
.. link:
.. description: What a Promise really is
.. type: text
-->

A `Promise` is an object.
";

    #[test]
    fn test_parse_comment_block() {
        let doc = FrontMatter::parse(POST).unwrap();
        let fm = &doc.front_matter;
        assert_eq!(fm.get("title"), Some("Promises, explained"));
        assert_eq!(fm.get("slug"), Some("promises-explained"));
        assert_eq!(fm.get("date"), Some("2024-01-31 14:09:07 UTC+05:30"));
        assert_eq!(fm.get("category"), Some(""));
        assert_eq!(fm.len(), 8);
        assert_eq!(doc.body, "A `Promise` is an object.\n");
        assert_eq!(doc.body_line, 12);
        assert_eq!(&POST[doc.body_offset..], doc.body);
    }

    #[test]
    fn test_empty_value_is_empty_string() {
        let doc = FrontMatter::parse("<!--\n.. title: X\n.. slug: x\n.. tags: \n-->\n# Hello").unwrap();
        assert_eq!(doc.front_matter.get("tags"), Some(""));
        assert_eq!(doc.body, "# Hello");
    }

    #[test]
    fn test_dash_fence_block() {
        let doc = FrontMatter::parse("---\r\n.. title: X\r\n.. slug: x\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(doc.front_matter.get("title"), Some("X"));
        assert_eq!(doc.body, "body\r\n");
    }

    #[test]
    fn test_leading_blank_lines_allowed() {
        let doc = FrontMatter::parse("\n\n<!--\n.. title: X\n.. slug: x\n-->\nbody").unwrap();
        assert_eq!(doc.front_matter.get("slug"), Some("x"));
        assert_eq!(doc.body_line, 7);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = FrontMatter::parse("<!--\n.. title: X\ntitle = Y\n-->\n").unwrap_err();
        match err {
            Error::MalformedFrontMatter { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unterminated_block() {
        let err = FrontMatter::parse("<!--\n.. title: X\n.. slug: x\n").unwrap_err();
        assert!(matches!(err, Error::MalformedFrontMatter { line: 1, .. }));
    }

    #[test]
    fn test_missing_required_fields() {
        let err = FrontMatter::parse("<!--\n.. slug: x\n-->\nbody").unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField("title")));

        let err = FrontMatter::parse("<!--\n.. title: X\n.. slug:\n-->\nbody").unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField("slug")));
    }

    #[test]
    fn test_no_front_matter() {
        let doc = FrontMatter::extract("# Just a heading\n\n<!--\n.. title: X\n-->").unwrap();
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body_offset, 0);
        assert!(doc.body.starts_with("# Just a heading"));

        assert!(matches!(
            FrontMatter::parse("# Just a heading"),
            Err(Error::MissingRequiredField("title"))
        ));
    }

    #[test]
    fn test_keys_are_lowercased_and_last_wins() {
        let doc = FrontMatter::parse("<!--\n.. Title: A\n.. slug: x\n.. title: B\n-->\n").unwrap();
        assert_eq!(doc.front_matter.get("title"), Some("B"));
        assert_eq!(doc.front_matter.len(), 2);
    }

    #[test]
    fn test_serialize_then_parse_keeps_fields() {
        let doc = FrontMatter::parse(POST).unwrap();
        let text = doc.front_matter.to_string();
        let reparsed = FrontMatter::parse(&text).unwrap();
        assert_eq!(reparsed.front_matter, doc.front_matter);
        assert_eq!(reparsed.body, "");
    }

    #[test]
    fn test_insert_folds_newlines() {
        let mut fm = FrontMatter::new();
        fm.insert("title", "two\nlines").unwrap();
        fm.insert("Slug", "x").unwrap();
        assert_eq!(fm.get("title"), Some("two lines"));
        assert_eq!(fm.get("slug"), Some("x"));
        assert!(matches!(fm.insert("bad key", "v"), Err(Error::InvalidKey(k)) if k == "bad key"));
    }
}
