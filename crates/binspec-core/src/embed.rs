//! Checksum embedding: acquire a filename→hash map and write it into the
//! spec under the resolved version key.
//!
//! Three acquisition strategies exist as a closed variant set. The manifest
//! modes (download, checksum-file) are all-or-nothing: a manifest that fails
//! to fetch or parse fails the operation. Calculate mode is best-effort per
//! asset and fails only when nothing at all was acquired.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use binspec_schema::spec::{ChecksumConfig, EmbeddedChecksum, InstallSpec};
use binspec_schema::HashAlgorithm;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::{AcquireError, ConfigError};
use crate::filename::FilenameGenerator;
use crate::github::ReleaseClient;
use crate::manifest::{ManifestEntry, filter_entries, parse_manifest};
use crate::template::{has_placeholder, interpolate, manifest_vars};

/// Upper bound on concurrent asset downloads in calculate mode. Releases
/// can carry dozens of assets; unbounded fan-out is a resource-exhaustion
/// risk.
pub const CALCULATE_CONCURRENCY: usize = 4;

/// How checksums are acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumSource {
    /// Download the checksum manifest named by the spec's template.
    Download,
    /// Read a caller-supplied local manifest.
    File(PathBuf),
    /// Fetch the live asset list and compute checksums per asset.
    Calculate,
}

impl ChecksumSource {
    fn mode_name(&self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::File(_) => "checksum-file",
            Self::Calculate => "calculate",
        }
    }
}

/// Result of a successful embed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOutcome {
    /// The version key the checksums were embedded under. Differs from the
    /// requested version when `latest` was resolved through the API.
    pub version: String,
    /// Number of embedded entries.
    pub count: usize,
}

/// Acquire checksums for `version` and embed them in the spec.
///
/// The embedded list for the resolved version key is replaced wholesale and
/// sorted by filename, so re-embedding is idempotent and the persisted
/// output is diff-stable.
///
/// # Errors
///
/// Configuration problems ([`ConfigError`]) surface before any network
/// activity. Manifest fetch/parse failures are fatal; per-asset failures in
/// calculate mode are logged and skipped unless every asset fails.
pub async fn embed_checksums(
    spec: &mut InstallSpec,
    client: &ReleaseClient,
    source: ChecksumSource,
    version: &str,
) -> Result<EmbedOutcome, AcquireError> {
    let (owner, repo) = spec
        .parse_repository()
        .map(|(o, r)| (o.to_string(), r.to_string()))
        .map_err(ConfigError::Spec)?;

    // Mode-independent configuration checks come first, so a bad spec never
    // triggers network traffic.
    if let ChecksumSource::Download = source {
        let template = manifest_template(spec)?;
        if has_placeholder(&template, "ASSET_FILENAME") {
            return Err(ConfigError::PerAssetTemplate {
                mode: source.mode_name(),
            }
            .into());
        }
    }

    // "latest" is resolved through the API so the embedded key always names
    // a concrete tag. Checksum-file mode never touches the network, so it
    // cannot resolve the alias and rejects it instead.
    let tag = if version == "latest" {
        if matches!(source, ChecksumSource::File(_)) {
            return Err(ConfigError::UnresolvedVersion {
                mode: source.mode_name(),
            }
            .into());
        }
        client.fetch_release(&owner, &repo, "latest").await?.tag_name
    } else {
        version.to_string()
    };

    let possible = FilenameGenerator::new(spec, &tag)
        .map(|g| g.possible_filenames())
        .unwrap_or_default();

    let entries = match &source {
        ChecksumSource::Download => {
            let template = manifest_template(spec)?;
            let name = spec.effective_name().map_err(ConfigError::Spec)?;
            let manifest_name = interpolate(&template, &manifest_vars(name, &tag));
            let text = client
                .download_asset_text(&owner, &repo, &tag, &manifest_name)
                .await?;
            filter_entries(parse_manifest(&text, &manifest_name)?, &possible)
        }
        ChecksumSource::File(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            let context = path.display().to_string();
            filter_entries(parse_manifest(&text, &context)?, &possible)
        }
        ChecksumSource::Calculate => {
            calculate_checksums(spec, client, &owner, &repo, &tag, &possible).await?
        }
    };

    if entries.is_empty() {
        return Err(AcquireError::NoChecksums {
            context: format!("{owner}/{repo}@{tag} ({} mode)", source.mode_name()),
        });
    }

    let mut embedded: Vec<EmbeddedChecksum> = entries
        .into_iter()
        .map(|e| EmbeddedChecksum {
            filename: e.filename,
            hash: e.hash,
        })
        .collect();
    embedded.sort_by(|a, b| a.filename.cmp(&b.filename));
    embedded.dedup_by(|a, b| a.filename == b.filename);
    let count = embedded.len();

    // Replacing the version key drops any stale entries from a prior run.
    spec.checksums
        .get_or_insert_with(ChecksumConfig::default)
        .embedded
        .insert(tag.clone(), embedded);

    info!(tag, count, mode = source.mode_name(), "embedded checksums");
    Ok(EmbedOutcome {
        version: tag,
        count,
    })
}

fn manifest_template(spec: &InstallSpec) -> Result<String, ConfigError> {
    spec.checksums
        .as_ref()
        .and_then(|c| c.template.clone())
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::MissingChecksumTemplate)
}

/// Calculate mode: use authoritative digests where the service provides
/// them, download and hash everything else under a bounded worker pool.
async fn calculate_checksums(
    spec: &InstallSpec,
    client: &ReleaseClient,
    owner: &str,
    repo: &str,
    tag: &str,
    possible: &BTreeSet<String>,
) -> Result<Vec<ManifestEntry>, AcquireError> {
    let release = client.fetch_release(owner, repo, tag).await?;
    let algorithm = spec.checksum_algorithm();

    let mut entries = Vec::new();
    let semaphore = Arc::new(Semaphore::new(CALCULATE_CONCURRENCY));
    let mut handles = Vec::new();

    for asset in release.assets {
        if !possible.contains(&asset.name) {
            continue;
        }

        // The service only publishes sha256 digests, so they are usable
        // directly only when the spec's algorithm agrees.
        if algorithm == HashAlgorithm::Sha256 {
            if let Some(digest) = asset.sha256_digest() {
                entries.push(ManifestEntry {
                    filename: asset.name,
                    hash: digest.as_str().to_string(),
                });
                continue;
            }
        }

        let client = client.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|_| AcquireError::Io(std::io::Error::other("semaphore closed")))?;
            let hash = client
                .download_and_digest(&asset.browser_download_url, algorithm)
                .await?;
            Ok::<ManifestEntry, AcquireError>(ManifestEntry {
                filename: asset.name,
                hash,
            })
        }));
    }

    for handle in handles {
        match handle.await.map_err(std::io::Error::other)? {
            Ok(entry) => entries.push(entry),
            // Best-effort batch: one bad asset does not abort its siblings.
            Err(err) => warn!(error = %err, "skipping asset whose checksum could not be computed"),
        }
    }

    Ok(entries)
}
