//! Format-preserving write-back of embedded checksums.
//!
//! Embedding edits a human-authored spec document, so persistence is a
//! structural patch over a parsed document tree rather than a full
//! re-serialization: only the checksum subtree is touched, and every other
//! byte (comments, key order, whitespace) survives verbatim.

use anyhow::{Context, Result};
use binspec_schema::spec::ChecksumConfig;
use toml_edit::{ArrayOfTables, DocumentMut, Item, Table, value};

/// Patch `document` so its checksum subtree carries the embedded entries
/// recorded for `version` in `config`, inserting the subtree if absent.
///
/// Entries are emitted in the order they appear in `config` (the embedder
/// keeps them filename-sorted), one `[[checksums.embedded."<version>"]]`
/// table per entry for diff-stable output.
///
/// # Errors
///
/// Returns an error if `document` is not valid TOML or if an existing
/// `checksums` key is not a table.
pub fn patch_embedded_checksums(
    document: &str,
    config: &ChecksumConfig,
    version: &str,
) -> Result<String> {
    let mut doc: DocumentMut = document.parse().context("Failed to parse spec document")?;

    if doc.get("checksums").is_none() {
        let mut table = Table::new();
        table.set_implicit(true);
        doc.insert("checksums", Item::Table(table));
    }
    let checksums = doc["checksums"]
        .as_table_mut()
        .context("'checksums' is not a table")?;

    if let Some(algorithm) = config.algorithm {
        checksums.insert("algorithm", value(algorithm.as_str()));
    }
    if let Some(template) = config.template.as_deref() {
        checksums.insert("template", value(template));
    }

    if checksums.get("embedded").is_none() {
        let mut table = Table::new();
        table.set_implicit(true);
        checksums.insert("embedded", Item::Table(table));
    }
    let embedded = checksums["embedded"]
        .as_table_mut()
        .context("'checksums.embedded' is not a table")?;

    let mut tables = ArrayOfTables::new();
    for entry in config.embedded.get(version).map(Vec::as_slice).unwrap_or_default() {
        let mut table = Table::new();
        table.insert("filename", value(&entry.filename));
        table.insert("hash", value(&entry.hash));
        tables.push(table);
    }
    embedded.insert(version, Item::ArrayOfTables(tables));

    Ok(doc.to_string())
}
