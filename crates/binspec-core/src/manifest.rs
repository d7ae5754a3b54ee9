//! Checksum manifest parsing and filtering.
//!
//! The manifest format is the conventional `shasum`/`sha256sum` output: one
//! `<hex-digest><whitespace>[*]<filename>` entry per line. Blank lines and
//! `#` comments are ignored; malformed lines are skipped with a warning
//! rather than failing the whole manifest.

use std::collections::BTreeSet;

use tracing::warn;

use crate::error::AcquireError;

/// One parsed `hash filename` pair from a checksum manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Asset filename, with any binary-mode `*` marker stripped.
    pub filename: String,
    /// Hex digest exactly as written.
    pub hash: String,
}

/// Parse a checksum manifest.
///
/// # Errors
///
/// Returns [`AcquireError::NoChecksums`] when no line parses, which covers
/// both empty manifests and completely malformed ones.
pub fn parse_manifest(text: &str, context: &str) -> Result<Vec<ManifestEntry>, AcquireError> {
    let mut entries = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(hash), Some(filename)) = (fields.next(), fields.next()) else {
            warn!(context, line, "skipping malformed checksum line");
            continue;
        };
        // `*` prefixes the filename in binary mode output.
        let filename = filename.strip_prefix('*').unwrap_or(filename);
        entries.push(ManifestEntry {
            filename: filename.to_string(),
            hash: hash.to_string(),
        });
    }

    if entries.is_empty() {
        return Err(AcquireError::NoChecksums {
            context: context.to_string(),
        });
    }
    Ok(entries)
}

/// Drop manifest entries whose filename the spec can never produce
/// (signatures, source archives, documentation).
///
/// When no possible filenames could be derived at all, filtering is a no-op
/// and every parsed entry passes through.
pub fn filter_entries(entries: Vec<ManifestEntry>, possible: &BTreeSet<String>) -> Vec<ManifestEntry> {
    if possible.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|e| possible.contains(&e.filename))
        .collect()
}
