//! `binspec embed` - acquire checksums and write them into the spec file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use binspec_core::persist::patch_embedded_checksums;
use binspec_core::{ChecksumSource, ReleaseClient, embed_checksums};

use crate::EmbedMode;

pub async fn embed(
    spec_path: &Path,
    version: Option<&str>,
    mode: EmbedMode,
    checksum_file: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let (mut spec, document) = super::load_spec(spec_path).await?;
    let version = super::resolve_version(version, &spec, Some("latest"))?;

    let source = match mode {
        EmbedMode::Download => ChecksumSource::Download,
        EmbedMode::ChecksumFile => {
            let Some(path) = checksum_file else {
                bail!("checksum-file mode requires --checksum-file");
            };
            ChecksumSource::File(path)
        }
        EmbedMode::Calculate => ChecksumSource::Calculate,
    };

    let client = ReleaseClient::new(reqwest::Client::new());
    let outcome = embed_checksums(&mut spec, &client, source, &version).await?;

    let checksums = spec
        .checksums
        .as_ref()
        .context("embedding left no checksum config")?;
    let patched = patch_embedded_checksums(&document, checksums, &outcome.version)?;

    if dry_run {
        print!("{patched}");
        return Ok(());
    }

    // Atomic write: temp file in the same directory, then rename.
    let temp_path = spec_path.with_extension("toml.tmp");
    tokio::fs::write(&temp_path, &patched)
        .await
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    tokio::fs::rename(&temp_path, spec_path)
        .await
        .with_context(|| format!("Failed to replace {}", spec_path.display()))?;

    println!(
        "Embedded {} checksum(s) for {} into {}",
        outcome.count,
        outcome.version,
        spec_path.display()
    );
    Ok(())
}
