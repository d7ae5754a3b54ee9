//! Command implementations, one module per subcommand.

pub mod completions;
pub mod embed;
pub mod filenames;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result, bail};
use binspec_schema::InstallSpec;

/// Load a spec and its raw document text in one go. The text is kept for
/// format-preserving write-back.
pub(crate) async fn load_spec(path: &Path) -> Result<(InstallSpec, String)> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let spec = InstallSpec::from_toml(&text)?;
    Ok((spec, text))
}

/// Pick the version tag for a command: explicit flag first, then the spec's
/// default, then `fallback` when one applies.
pub(crate) fn resolve_version(
    flag: Option<&str>,
    spec: &InstallSpec,
    fallback: Option<&str>,
) -> Result<String> {
    if let Some(v) = flag {
        return Ok(v.to_string());
    }
    if let Some(v) = spec.version.as_deref() {
        return Ok(v.to_string());
    }
    if let Some(v) = fallback {
        return Ok(v.to_string());
    }
    bail!("no version given and the spec declares no default; pass --version")
}
