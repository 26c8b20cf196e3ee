//! Post collection and listings
//!
//! A [`Collection`] owns every post of a run, sorted newest first with ties
//! broken by slug. Listings borrow from it and are cheap to rebuild.

use chrono::{DateTime, Datelike, FixedOffset};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::content::Post;
use crate::error::{Error, Result};

/// All posts of one build, in listing order
#[derive(Debug, Clone, Default)]
pub struct Collection {
    posts: Vec<Post>,
}

/// An ordered view over some posts of a collection.
///
/// Iterating a listing does not consume it; every call to [`Listing::iter`]
/// starts again from the newest post.
#[derive(Debug, Clone, Default)]
pub struct Listing<'a> {
    posts: Vec<&'a Post>,
}

/// The parts of a post shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub date: DateTime<FixedOffset>,
    pub description: Option<&'a str>,
}

/// Newest first; equal dates fall back to slug order
pub fn listing_order(a: &Post, b: &Post) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
}

impl Collection {
    /// Build a collection, rejecting duplicate slugs
    pub fn new(mut posts: Vec<Post>) -> Result<Self> {
        posts.sort_by(|a, b| a.source.cmp(&b.source));

        let mut seen: HashMap<&str, &Post> = HashMap::with_capacity(posts.len());
        for post in &posts {
            if let Some(first) = seen.insert(post.slug.as_str(), post) {
                return Err(Error::DuplicateSlug {
                    slug: post.slug.clone(),
                    first: first.source.clone(),
                    second: post.source.clone(),
                });
            }
        }

        posts.sort_by(listing_order);
        Ok(Self { posts })
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// Every post, newest first
    pub fn chronological(&self) -> Listing<'_> {
        Listing {
            posts: self.posts.iter().collect(),
        }
    }

    /// One listing per distinct tag
    pub fn by_tag(&self) -> BTreeMap<&str, Listing<'_>> {
        let mut groups: BTreeMap<&str, Listing<'_>> = BTreeMap::new();
        for post in &self.posts {
            for tag in &post.tags {
                groups.entry(tag.as_str()).or_default().posts.push(post);
            }
        }
        groups
    }

    /// One listing per distinct category
    pub fn by_category(&self) -> BTreeMap<&str, Listing<'_>> {
        let mut groups: BTreeMap<&str, Listing<'_>> = BTreeMap::new();
        for post in &self.posts {
            if let Some(category) = post.category.as_deref() {
                groups.entry(category).or_default().posts.push(post);
            }
        }
        groups
    }

    /// One listing per year, newest year first
    pub fn archive(&self) -> Vec<(i32, Listing<'_>)> {
        let mut years: Vec<(i32, Listing<'_>)> = Vec::new();
        for post in &self.posts {
            let year = post.date.year();
            match years.last_mut() {
                Some((y, listing)) if *y == year => listing.posts.push(post),
                _ => years.push((year, Listing { posts: vec![post] })),
            }
        }
        years
    }

    /// The posts before and after `index` in listing order: (newer, older)
    pub fn neighbours(&self, index: usize) -> (Option<&Post>, Option<&Post>) {
        let newer = index.checked_sub(1).and_then(|i| self.posts.get(i));
        (newer, self.posts.get(index + 1))
    }
}

impl<'a> Listing<'a> {
    /// Summaries in listing order, produced on demand
    pub fn iter(&self) -> impl Iterator<Item = PostSummary<'a>> + '_ {
        self.posts.iter().map(|post| PostSummary::from(*post))
    }

    pub fn posts(&self) -> &[&'a Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Split into pages of at most `per_page` posts
    pub fn pages(&self, per_page: usize) -> impl Iterator<Item = &[&'a Post]> + '_ {
        self.posts.chunks(per_page.max(1))
    }
}

impl<'a> From<&'a Post> for PostSummary<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            title: &post.title,
            slug: &post.slug,
            date: post.date,
            description: post.description.as_deref(),
        }
    }
}
