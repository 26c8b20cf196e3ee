#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::Path;

pub fn nikola_cmd() -> Command {
    let mut cmd = Command::cargo_bin("nikola-rs").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Write a post with a Nikola-style front-matter block
pub fn write_post(dir: &Path, file: &str, slug: &str, date: &str, tags: &str, body: &str) {
    let path = dir.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        path,
        format!(
            "<!--\n.. title: About {slug}\n.. slug: {slug}\n.. date: {date}\n.. tags: {tags}\n.. category: \n.. link: \n.. description: A post about {slug}\n.. type: text\n-->\n\n{body}\n"
        ),
    )
    .unwrap();
}

/// Relative path -> contents of every file under `dir`
pub fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<_> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_string_lossy().to_string();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}
