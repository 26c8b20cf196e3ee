//! Generator module - renders pages using the built-in Tera templates
//!
//! Rendering is pure: every page is a function of the collection and the
//! site configuration, so an unchanged input produces identical output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tera::Context;

use crate::collection::{Collection, Listing};
use crate::content::{html_escape, MarkdownRenderer, Post, Rendered};
use crate::error::Result;
use crate::helpers::{category_path, full_url_for, post_path, tag_path, url_for};
use crate::templates::{
    strip_html, ArchiveYearData, ConfigData, LinkData, NavPost, PaginationData, PostData,
    SummaryData, TemplateRenderer, TermData,
};
use crate::Site;

/// A generated file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub path: PathBuf,
    pub contents: String,
    /// Parts of the source that were rendered as literal text
    pub warnings: Vec<String>,
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
    config_data: ConfigData,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let templates = TemplateRenderer::new()?;
        let markdown = MarkdownRenderer::with_options(&site.config.highlight);
        let config_data = build_config_data(site);

        Ok(Self {
            site: site.clone(),
            templates,
            markdown,
            config_data,
        })
    }

    /// Render a post's markdown body
    pub fn render_body(&self, post: &Post) -> Rendered {
        self.markdown.render(&post.body)
    }

    /// Render the page of the post at `index` in the collection
    pub fn render_post(&self, collection: &Collection, index: usize) -> Result<RenderedPage> {
        let post = &collection.posts()[index];
        let body = self.render_body(post);
        let (newer, older) = collection.neighbours(index);

        let mut context = self.create_base_context();
        context.insert("post", &self.post_data(post, body.html));
        context.insert("newer", &newer.map(|p| self.nav_post(p)));
        context.insert("older", &older.map(|p| self.nav_post(p)));

        let contents = self.templates.render("post.html", &context)?;
        let path = page_file(&post_path(&self.site.config, &post.slug));
        tracing::debug!("Rendered: {:?}", path);

        Ok(RenderedPage {
            path,
            contents,
            warnings: body.warnings,
        })
    }

    /// Render every aggregate page: the paginated index, the archive, tag
    /// and category listings, the feed and the search index
    pub fn render_indexes(&self, collection: &Collection) -> Result<Vec<RenderedPage>> {
        let mut pages = self.render_index_pages(collection)?;
        pages.push(self.render_archive_page(collection)?);
        pages.extend(self.render_tag_pages(collection)?);
        pages.extend(self.render_category_pages(collection)?);

        let config = &self.site.config;
        if config.feed.enable {
            pages.push(RenderedPage {
                path: PathBuf::from(&config.feed.path),
                contents: self.atom_feed(collection),
                warnings: Vec::new(),
            });
        }
        if config.search_index {
            pages.push(RenderedPage {
                path: PathBuf::from("search.json"),
                contents: self.search_index(collection)?,
                warnings: Vec::new(),
            });
        }

        Ok(pages)
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.config_data);
        context
    }

    /// Generate index pages with pagination
    fn render_index_pages(&self, collection: &Collection) -> Result<Vec<RenderedPage>> {
        let per_page = self.site.config.per_page;
        let listing = collection.chronological();
        let total_pages = listing.len().div_ceil(per_page).max(1);

        let mut pages = Vec::with_capacity(total_pages);
        let mut chunks = listing.pages(per_page);

        for page_num in 1..=total_pages {
            let page_posts: Vec<SummaryData> = chunks
                .next()
                .unwrap_or_default()
                .iter()
                .map(|p| self.summary_data(p))
                .collect();

            let pagination = PaginationData {
                per_page,
                total: total_pages,
                current: page_num,
                prev_link: match page_num {
                    1 => String::new(),
                    2 => url_for(&self.site.config, ""),
                    n => url_for(&self.site.config, &index_page_path(n - 1)),
                },
                next_link: if page_num < total_pages {
                    url_for(&self.site.config, &index_page_path(page_num + 1))
                } else {
                    String::new()
                },
            };

            let mut context = self.create_base_context();
            context.insert("posts", &page_posts);
            context.insert("pagination", &pagination);

            pages.push(RenderedPage {
                path: page_file(&index_page_path(page_num)),
                contents: self.templates.render("index.html", &context)?,
                warnings: Vec::new(),
            });
        }

        Ok(pages)
    }

    /// Generate the archive page, grouped by year
    fn render_archive_page(&self, collection: &Collection) -> Result<RenderedPage> {
        let years: Vec<ArchiveYearData> = collection
            .archive()
            .into_iter()
            .map(|(year, listing)| ArchiveYearData {
                year,
                posts: self.summaries(&listing),
            })
            .collect();

        let mut context = self.create_base_context();
        context.insert("years", &years);

        Ok(RenderedPage {
            path: page_file(&format!("{}/", self.site.config.archive_dir.trim_matches('/'))),
            contents: self.templates.render("archive.html", &context)?,
            warnings: Vec::new(),
        })
    }

    /// Generate the tag overview and one listing per tag
    fn render_tag_pages(&self, collection: &Collection) -> Result<Vec<RenderedPage>> {
        let config = &self.site.config;
        self.render_terms(
            "Tags",
            &config.tag_dir,
            collection.by_tag(),
            |name| tag_path(config, name),
            |name| format!("Posts about \u{201c}{}\u{201d}", name),
        )
    }

    /// Generate the category overview and one listing per category
    fn render_category_pages(&self, collection: &Collection) -> Result<Vec<RenderedPage>> {
        let config = &self.site.config;
        self.render_terms(
            "Categories",
            &config.category_dir,
            collection.by_category(),
            |name| category_path(config, name),
            |name| format!("Posts in \u{201c}{}\u{201d}", name),
        )
    }

    fn render_terms(
        &self,
        heading: &str,
        dir: &str,
        groups: BTreeMap<&str, Listing<'_>>,
        path_of: impl Fn(&str) -> String,
        heading_of: impl Fn(&str) -> String,
    ) -> Result<Vec<RenderedPage>> {
        let mut pages = Vec::with_capacity(groups.len() + 1);
        let mut terms = Vec::with_capacity(groups.len());
        let mut used_paths: BTreeMap<String, &str> = BTreeMap::new();

        for (name, listing) in &groups {
            let path = path_of(name);
            if let Some(other) = used_paths.insert(path.clone(), name) {
                tracing::warn!("{:?} and {:?} share the page {:?}", other, name, path);
            }

            terms.push(TermData {
                name: html_escape(name),
                url: url_for(&self.site.config, &path),
                count: listing.len(),
            });

            let mut context = self.create_base_context();
            context.insert("heading", &html_escape(&heading_of(name)));
            context.insert("posts", &self.summaries(listing));

            pages.push(RenderedPage {
                path: page_file(&path),
                contents: self.templates.render("listing.html", &context)?,
                warnings: Vec::new(),
            });
        }

        let mut context = self.create_base_context();
        context.insert("heading", heading);
        context.insert("terms", &terms);
        pages.push(RenderedPage {
            path: page_file(&format!("{}/", dir.trim_matches('/'))),
            contents: self.templates.render("terms.html", &context)?,
            warnings: Vec::new(),
        });

        Ok(pages)
    }

    /// Generate an Atom feed of the most recent posts
    fn atom_feed(&self, collection: &Collection) -> String {
        let config = &self.site.config;
        let site_url = full_url_for(config, "");
        // newest post date keeps the feed stable across rebuilds
        let updated = collection
            .posts()
            .first()
            .map(|p| p.date.to_rfc3339())
            .unwrap_or_else(|| "1970-01-01T00:00:00+00:00".to_string());

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(config, &config.feed.path)
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", site_url));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", site_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for post in collection.posts().iter().take(config.feed.limit) {
            let url = full_url_for(config, &post_path(config, &post.slug));
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", url));
            feed.push_str(&format!("    <id>{}</id>\n", url));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                post.date.to_rfc3339()
            ));
            feed.push_str(&format!("    <updated>{}</updated>\n", post.date.to_rfc3339()));
            for tag in &post.tags {
                feed.push_str(&format!("    <category term=\"{}\"/>\n", escape_xml(tag)));
            }
            if let Some(description) = &post.description {
                feed.push_str(&format!(
                    "    <summary>{}</summary>\n",
                    escape_xml(description)
                ));
            }
            let content = match post.teaser() {
                Some(teaser) => self.markdown.render(teaser).html,
                None => self.render_body(post).html,
            };
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                content.replace("]]>", "]]]]><![CDATA[>")
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");
        feed
    }

    /// Generate search index (JSON)
    fn search_index(&self, collection: &Collection) -> Result<String> {
        let search_data: Vec<serde_json::Value> = collection
            .posts()
            .iter()
            .map(|p| {
                let text = strip_html(&self.render_body(p).html);
                serde_json::json!({
                    "title": p.title,
                    "url": url_for(&self.site.config, &post_path(&self.site.config, &p.slug)),
                    "date": p.date.to_rfc3339(),
                    "tags": p.tags,
                    "content": text.trim(),
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&search_data)?)
    }

    fn post_data(&self, post: &Post, content: String) -> PostData {
        let config = &self.site.config;
        PostData {
            title: html_escape(&post.title),
            slug: post.slug.clone(),
            date: post.date.format(&config.date_format).to_string(),
            date_iso: post.date.to_rfc3339(),
            url: url_for(config, &post_path(config, &post.slug)),
            tags: post
                .tags
                .iter()
                .map(|tag| LinkData {
                    name: html_escape(tag),
                    url: url_for(config, &tag_path(config, tag)),
                })
                .collect(),
            category: post.category.as_ref().map(|category| LinkData {
                name: html_escape(category),
                url: url_for(config, &category_path(config, category)),
            }),
            description: post.description.as_deref().map(html_escape),
            link: post.link.as_deref().map(html_escape),
            post_type: post.post_type.to_string(),
            content,
            extra: post
                .extra
                .iter()
                .map(|(k, v)| (k.clone(), html_escape(v)))
                .collect(),
        }
    }

    fn summary_data(&self, post: &Post) -> SummaryData {
        let config = &self.site.config;
        SummaryData {
            title: html_escape(&post.title),
            url: url_for(config, &post_path(config, &post.slug)),
            date: post.date.format(&config.date_format).to_string(),
            date_iso: post.date.to_rfc3339(),
            description: post.description.as_deref().map(html_escape),
            teaser: post.teaser().map(|t| self.markdown.render(t).html),
        }
    }

    fn summaries(&self, listing: &Listing<'_>) -> Vec<SummaryData> {
        listing.posts().iter().map(|p| self.summary_data(p)).collect()
    }

    fn nav_post(&self, post: &Post) -> NavPost {
        NavPost {
            title: html_escape(&post.title),
            url: url_for(&self.site.config, &post_path(&self.site.config, &post.slug)),
        }
    }
}

fn build_config_data(site: &Site) -> ConfigData {
    let config = &site.config;
    ConfigData {
        title: html_escape(&config.title),
        subtitle: html_escape(&config.subtitle),
        description: html_escape(&config.description),
        author: html_escape(&config.author),
        language: html_escape(&config.language),
        url: config.url.clone(),
        root: url_for(config, ""),
        feed_url: url_for(config, &config.feed.path),
        archive_url: url_for(config, &format!("{}/", config.archive_dir.trim_matches('/'))),
        tags_url: url_for(config, &format!("{}/", config.tag_dir.trim_matches('/'))),
        categories_url: url_for(config, &format!("{}/", config.category_dir.trim_matches('/'))),
    }
}

/// Path of the n-th page of the chronological index
fn index_page_path(page_num: usize) -> String {
    if page_num == 1 {
        String::new()
    } else {
        format!("page/{}/", page_num)
    }
}

/// The `index.html` file inside a page directory
fn page_file(dir: &str) -> PathBuf {
    Path::new(dir.trim_start_matches('/')).join("index.html")
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
