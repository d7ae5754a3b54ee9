//! `binspec verify` - check a downloaded asset against the spec.
//!
//! This is the strict call site of the missing-checksum policy: absent a
//! `--skip-missing` flag, "no checksum anywhere" is a hard failure.

use std::path::Path;

use anyhow::{Context, Result};
use binspec_core::{MissingChecksumPolicy, ReleaseClient, Verifier, VerifyOutcome};

pub async fn verify(
    spec_path: &Path,
    file: &Path,
    version: Option<&str>,
    filename: Option<&str>,
    skip_missing: bool,
) -> Result<()> {
    let (spec, _) = super::load_spec(spec_path).await?;
    let version = super::resolve_version(version, &spec, None)?;

    let filename = match filename {
        Some(f) => f.to_string(),
        None => file
            .file_name()
            .and_then(|n| n.to_str())
            .context("cannot derive an asset filename from the file path; pass --filename")?
            .to_string(),
    };

    let policy = if skip_missing {
        MissingChecksumPolicy::Warn
    } else {
        MissingChecksumPolicy::Fail
    };

    let client = ReleaseClient::new(reqwest::Client::new());
    let outcome = Verifier::new(&spec, &client)
        .verify(&version, file, &filename, policy)
        .await?;

    match outcome {
        VerifyOutcome::Verified { digest } => {
            println!("OK {filename} ({digest})");
        }
        VerifyOutcome::Skipped => {
            println!("SKIPPED {filename} (no checksum available)");
        }
    }
    Ok(())
}
