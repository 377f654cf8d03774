//! Create record files in the records directory.

use super::{LocalRecord, Record};
use anyhow::{Context, Result};
use std::path::Path;

/// Create a new record file in the records directory.
///
/// Generates a human-readable filename from the record's date/time and
/// title, handling collisions with numeric suffixes (-2, -3, etc).
///
/// Returns the created LocalRecord.
pub fn create(dir: &Path, record: &Record) -> Result<LocalRecord> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let content = serde_json::to_string_pretty(record)?;
    let filename = unique_filename(&base_filename(record), dir);
    let path = dir.join(&filename);

    std::fs::write(&path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(LocalRecord {
        path,
        record: record.clone(),
    })
}

/// Generate the base filename for a record (without collision suffix).
fn base_filename(record: &Record) -> String {
    format!(
        "{}__{}.json",
        record.date().format("%Y-%m-%dT%H%M"),
        slugify(record.title())
    )
}

/// Add numeric suffixes (-2, -3, ...) until the filename is free.
fn unique_filename(base: &str, dir: &Path) -> String {
    if !dir.join(base).exists() {
        return base.to_string();
    }
    let stem = base.trim_end_matches(".json");
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}.json", stem, n);
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Convert a title to a filename-safe slug.
fn slugify(s: &str) -> String {
    let slug = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    slug.chars().take(50).collect()
}
