//! Error taxonomy for the resolution and checksum engine.
//!
//! Configuration problems are always fatal and surface before any network
//! activity. Acquisition failures are fatal for the manifest-based modes and
//! per-asset for calculate mode. A checksum mismatch is always fatal and
//! carries both digests for diagnosability.

use binspec_schema::spec::SpecError;
use thiserror::Error;

/// Spec problems detected before any network activity.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing or malformed `name`/`repository` fields.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Filename generation requires an asset template.
    #[error("asset template is not configured")]
    MissingAssetTemplate,

    /// Manifest download requires a checksum template.
    #[error("checksum template is not configured")]
    MissingChecksumTemplate,

    /// `${ASSET_FILENAME}` names one manifest per asset, which cannot be
    /// discovered by name alone.
    #[error(
        "checksum template contains ${{ASSET_FILENAME}}, which the '{mode}' mode cannot resolve; use the calculate mode instead"
    )]
    PerAssetTemplate {
        /// The rejected acquisition mode.
        mode: &'static str,
    },

    /// The offline modes cannot turn `latest` into a concrete tag, and a
    /// floating version key must never be embedded.
    #[error("version 'latest' cannot be resolved in the '{mode}' mode; pass a concrete tag")]
    UnresolvedVersion {
        /// The rejected acquisition mode.
        mode: &'static str,
    },
}

/// Failures while acquiring checksums or release metadata.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// Fatal configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("unexpected status {status} fetching {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: reqwest::StatusCode,
    },

    /// Local file failure (checksum-file mode, temp storage).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A manifest or calculate run yielded nothing usable.
    #[error("no checksums found for {context}")]
    NoChecksums {
        /// What was being acquired (manifest name, release tag).
        context: String,
    },
}

/// Failures while verifying a downloaded file.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Manifest fallback acquisition failed.
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    /// No checksum could be resolved for the asset.
    #[error("no checksum found for {filename} (version {version})")]
    NoChecksum {
        /// Asset filename.
        filename: String,
        /// Version key that was searched.
        version: String,
    },

    /// The computed digest differs from the expected one.
    #[error("checksum mismatch for {filename}: expected {expected}, computed {actual}")]
    Mismatch {
        /// Asset filename.
        filename: String,
        /// Digest the spec or manifest promised.
        expected: String,
        /// Digest computed from the local file.
        actual: String,
    },

    /// The local file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
