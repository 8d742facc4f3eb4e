pub mod json;

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::models::ContentItem;

/// Counts from one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStats {
    pub files: usize,
    pub items: usize,
    pub duplicates: usize,
}

/// Accumulates items across files, dropping ids already seen.
#[derive(Debug, Default)]
struct Loader {
    items: Vec<ContentItem>,
    seen: HashSet<String>,
    stats: LoadStats,
}

impl Loader {
    fn add(&mut self, parsed: Vec<ContentItem>, origin: &str) {
        self.stats.files += 1;
        for item in parsed {
            if !self.seen.insert(item.id.clone()) {
                info!("Skipping duplicate item {} from {origin}", item.id);
                self.stats.duplicates += 1;
                continue;
            }
            self.items.push(item);
        }
    }

    fn finish(mut self) -> (Vec<ContentItem>, LoadStats) {
        self.stats.items = self.items.len();
        (self.items, self.stats)
    }
}

/// Load items from files, directories or glob patterns; stdin when `paths` is empty.
pub fn load(paths: &[String]) -> Result<(Vec<ContentItem>, LoadStats)> {
    if paths.is_empty() {
        load_stdin()
    } else {
        load_paths(paths)
    }
}

pub fn load_paths(paths: &[String]) -> Result<(Vec<ContentItem>, LoadStats)> {
    let mut loader = Loader::default();

    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_dir() {
            load_directory(&mut loader, path)?;
        } else if path.is_file() {
            load_file(&mut loader, path)?;
        } else {
            // Try glob pattern
            let matches: Vec<_> = glob::glob(path_str)
                .with_context(|| format!("Invalid path or glob pattern: {path_str}"))?
                .filter_map(|r| r.ok())
                .collect();

            if matches.is_empty() {
                bail!("No files found matching: {path_str}");
            }

            for entry in matches {
                if entry.is_file() {
                    load_file(&mut loader, &entry)?;
                }
            }
        }
    }

    let (items, stats) = loader.finish();
    info!(
        "Loaded {} items from {} files ({} duplicates skipped)",
        stats.items, stats.files, stats.duplicates
    );
    Ok((items, stats))
}

pub fn load_stdin() -> Result<(Vec<ContentItem>, LoadStats)> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;

    if content.trim().is_empty() {
        bail!("Empty input from stdin");
    }

    let mut loader = Loader::default();
    loader.add(json::parse_json(&content)?, "stdin");
    Ok(loader.finish())
}

fn load_directory(loader: &mut Loader, dir: &Path) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            load_directory(loader, &path)?;
        } else if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            load_file(loader, &path)?;
        }
    }

    Ok(())
}

fn load_file(loader: &mut Loader, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let parsed = json::parse_json(&content)
        .with_context(|| format!("Failed to load timeline: {}", path.display()))?;
    loader.add(parsed, &path.display().to_string());
    Ok(())
}
