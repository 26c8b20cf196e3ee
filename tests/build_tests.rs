mod common;

use common::{snapshot, write_post};
use nikola_rs::commands::build::{self, BuildOptions};
use nikola_rs::{Error, Site};
use std::fs;
use std::path::PathBuf;

const PROMISES_POST: &str = "<!--
.. title: JavaScript Promises
.. slug: javascript-promises
.. date: 2024-01-31 14:09:07 UTC+05:30
.. tags: javascript, promises
.. category: Tutorials
.. link:
.. description: How promises settle
.. type: text
-->

# What is a Promise?

A promise is *eventually* a value. See [MDN](https://developer.mozilla.org).

> Promises are a one-shot thing.

    var p = new Promise(function (resolve, reject) {
        setTimeout(resolve, 100,   'done');
    });

Use `then` to chain.
";

fn site_with_posts() -> (tempfile::TempDir, Site) {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts");
    fs::create_dir_all(&posts).unwrap();
    fs::write(posts.join("promises.md"), PROMISES_POST).unwrap();
    write_post(&posts, "async.md", "async-await", "2024-02-10 09:00 UTC", "javascript", "Async *functions*.");
    write_post(&posts, "old/callbacks.md", "callbacks", "2023-05-01 12:00:00 UTC-07:00", "", "Callback hell.");
    let site = Site::new(dir.path()).unwrap();
    (dir, site)
}

#[tokio::test]
async fn test_build_renders_every_page() {
    let (_dir, site) = site_with_posts();
    let report = build::run(&site, BuildOptions::default()).await.unwrap();

    assert!(report.fatal.is_none());
    assert!(report.failed.is_empty());
    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(report.exit_code(true), 0);

    let out = &site.output_dir;
    let page = fs::read_to_string(out.join("posts/javascript-promises/index.html")).unwrap();
    assert!(page.contains("<h1>What is a Promise?</h1>"));
    assert!(page.contains("<blockquote>"));
    assert!(page.contains("<a href=\"https://developer.mozilla.org\">MDN</a>"));
    assert!(page.contains(
        "<pre><code>var p = new Promise(function (resolve, reject) {\n    setTimeout(resolve, 100,   &#39;done&#39;);\n});\n</code></pre>"
    ));
    assert!(page.contains("<code>then</code>"));
    assert!(page.contains("<a href=\"/tags/promises/\">promises</a>"));

    for path in [
        "index.html",
        "archive/index.html",
        "tags/index.html",
        "tags/javascript/index.html",
        "categories/index.html",
        "categories/tutorials/index.html",
        "atom.xml",
        "search.json",
        "posts/async-await/index.html",
        "posts/callbacks/index.html",
    ] {
        assert!(out.join(path).is_file(), "missing {path}");
    }

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    let newest = index.find("/posts/async-await/").unwrap();
    let middle = index.find("/posts/javascript-promises/").unwrap();
    let oldest = index.find("/posts/callbacks/").unwrap();
    assert!(newest < middle && middle < oldest);
}

#[tokio::test]
async fn test_rebuild_is_byte_identical() {
    let (_dir, site) = site_with_posts();
    build::run(&site, BuildOptions::default()).await.unwrap();
    let first = snapshot(&site.output_dir);

    build::run(&site, BuildOptions { clean: true }).await.unwrap();
    let second = snapshot(&site.output_dir);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_bad_post_does_not_block_others() {
    let (dir, site) = site_with_posts();
    let posts = dir.path().join("posts");
    fs::write(posts.join("broken.md"), "<!--\n.. title: Broken\nslug = broken\n-->\nbody").unwrap();
    fs::write(
        posts.join("baddate.md"),
        "<!--\n.. title: Bad\n.. slug: bad\n.. date: next tuesday\n-->\nbody",
    )
    .unwrap();

    let report = build::run(&site, BuildOptions::default()).await.unwrap();
    assert!(report.fatal.is_none());
    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.failed[0].0, PathBuf::from("baddate.md"));
    assert!(matches!(report.failed[0].1, Error::InvalidDate(_)));
    assert!(matches!(report.failed[1].1, Error::MalformedFrontMatter { line: 3, .. }));
    assert_eq!(report.exit_code(false), 0);
    assert_eq!(report.exit_code(true), 2);

    assert!(site.output_dir.join("posts/javascript-promises/index.html").is_file());
    assert!(!site.output_dir.join("posts/bad").exists());
}

#[tokio::test]
async fn test_duplicate_slug_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts");
    write_post(&posts, "one.md", "a", "2024-01-01", "", "One.");
    write_post(&posts, "two.md", "a", "2024-01-02", "", "Two.");

    let site = Site::new(dir.path()).unwrap();
    let report = build::run(&site, BuildOptions::default()).await.unwrap();

    match &report.fatal {
        Some(Error::DuplicateSlug { slug, first, second }) => {
            assert_eq!(slug, "a");
            assert_eq!(first, &PathBuf::from("one.md"));
            assert_eq!(second, &PathBuf::from("two.md"));
        }
        other => panic!("expected duplicate slug, got {other:?}"),
    }
    assert_eq!(report.exit_code(false), 1);
    assert!(!site.output_dir.exists());
}

#[tokio::test]
async fn test_equal_dates_ordered_by_slug() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts");
    write_post(&posts, "1.md", "zeta", "2024-01-01 10:00 UTC", "same", "Z.");
    write_post(&posts, "2.md", "alpha", "2024-01-01 10:00 UTC", "same", "A.");

    let site = Site::new(dir.path()).unwrap();
    build::run(&site, BuildOptions::default()).await.unwrap();

    let listing = fs::read_to_string(site.output_dir.join("tags/same/index.html")).unwrap();
    assert!(listing.find("/posts/alpha/").unwrap() < listing.find("/posts/zeta/").unwrap());
}

#[tokio::test]
async fn test_unterminated_fence_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts");
    write_post(&posts, "fence.md", "fence", "2024-01-01", "", "Text\n\n```\nconst x = 1;");

    let site = Site::new(dir.path()).unwrap();
    let report = build::run(&site, BuildOptions::default()).await.unwrap();

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.degraded.len(), 1);
    assert!(matches!(report.degraded[0].1, Error::RenderDegraded(_)));
    let page = fs::read_to_string(site.output_dir.join("posts/fence/index.html")).unwrap();
    assert!(page.contains("const x = 1;"));
}

#[tokio::test]
async fn test_non_ascii_offset_fails_only_its_post() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts");
    write_post(&posts, "good.md", "good", "2024-01-01 10:00 UTC", "", "Good.");
    write_post(&posts, "bad.md", "bad", "2024-01-01 10:00 UTC+0é0", "", "Bad.");

    let site = Site::new(dir.path()).unwrap();
    let report = build::run(&site, BuildOptions::default()).await.unwrap();

    assert!(report.fatal.is_none());
    assert_eq!(report.succeeded, vec![(PathBuf::from("good.md"), "good".to_string())]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, PathBuf::from("bad.md"));
    assert!(matches!(report.failed[0].1, Error::InvalidDate(_)));
    assert!(site.output_dir.join("posts/good/index.html").is_file());
}

#[tokio::test]
async fn test_dot_slug_is_rejected_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts");
    write_post(&posts, "a.md", "..", "2024-01-01", "", "Dotted body.");
    write_post(&posts, "b.md", ".", "2024-01-02", "", "Single dot.");

    let site = Site::new(dir.path()).unwrap();
    let report = build::run(&site, BuildOptions::default()).await.unwrap();

    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed.len(), 2);
    for (_, error) in &report.failed {
        assert!(matches!(error, Error::MissingRequiredField("slug")));
    }
    let index = fs::read_to_string(site.output_dir.join("index.html")).unwrap();
    assert!(!index.contains("Dotted body."));
    assert!(!site.output_dir.join("posts/index.html").exists());
}

#[test]
fn test_invalid_date_format_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    write_post(&dir.path().join("posts"), "a.md", "a", "2024-01-01", "", "A.");
    fs::write(dir.path().join("_config.yml"), "date_format: \"%Q\"\n").unwrap();

    let err = Site::new(dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("date_format"));
}
