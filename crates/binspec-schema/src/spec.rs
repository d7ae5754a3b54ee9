//! The install spec document model.
//!
//! A spec (`binspec.toml`) declares how a project's release binaries are
//! named, verified, and laid out. It is passive data: rule resolution and
//! checksum embedding live in `binspec-core` and operate on these structs.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::hash::HashAlgorithm;
use crate::platform::{Arch, Os};

static REPOSITORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("valid regex"));

/// Errors raised while validating spec fields.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The spec has no `repository` field but one is required.
    #[error("spec has no repository")]
    MissingRepository,

    /// The `repository` field does not look like `owner/name`.
    #[error("invalid repository '{0}': expected owner/name")]
    InvalidRepository(String),

    /// Neither `name` nor `repository` is present, so no project name can
    /// be derived.
    #[error("spec has no name and no repository to derive one from")]
    MissingName,
}

/// Top-level install spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallSpec {
    /// Project name. Defaults to the repository tail when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Source repository as `owner/name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Default version tag used when the caller does not supply one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// How release assets are named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetConfig>,

    /// How release assets are verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksums: Option<ChecksumConfig>,

    /// How downloaded archives are unpacked. Consumed by installers, not by
    /// the resolution engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpack: Option<UnpackConfig>,

    /// Platforms the project actually releases for. When present, filename
    /// enumeration iterates exactly this list instead of the full matrix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_platforms: Option<Vec<Platform>>,
}

/// One (OS, architecture) pair from the closed platform enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

/// Asset naming configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Filename template with `${NAME} ${VERSION} ${TAG} ${OS} ${ARCH}
    /// ${EXT}` placeholders. Required for any filename generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Extension seeded into `${EXT}` before rules run (e.g. `.tar.gz`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_extension: Option<String>,

    /// Binaries contained in each asset, in archive order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binaries: Vec<BinaryEntry>,

    /// Ordered override rules; all matching rules apply cumulatively.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<AssetRule>,

    /// Casing applied to the OS/arch labels before any rule runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_convention: Option<NamingConvention>,

    /// Architecture-emulation knobs for platforms that can run foreign
    /// binaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch_emulation: Option<ArchEmulation>,
}

/// A binary shipped inside a release asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryEntry {
    /// Name the binary is installed as.
    pub name: String,
    /// Path of the binary within the unpacked archive.
    pub path: String,
}

/// A conditional override applied during asset resolution.
///
/// The `when` clause is matched against the *original* requested platform,
/// never against values already rewritten by an earlier rule. Every matching
/// rule overlays its non-empty fields onto the running resolution state, in
/// declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetRule {
    /// Match condition. Empty fields are wildcards.
    #[serde(default)]
    pub when: RuleCondition,

    /// Replacement OS label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    /// Replacement architecture label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,

    /// Replacement extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,

    /// Full template replacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Full binaries-list replacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binaries: Option<Vec<BinaryEntry>>,
}

/// The `when` clause of an [`AssetRule`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleCondition {
    /// Required OS (canonical lowercase name), or any OS when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Required architecture (canonical name), or any arch when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

/// Casing applied to platform labels before rules run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NamingConvention {
    /// OS label casing. Defaults to lowercase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Casing>,
}

/// Label casing variants. Architectures are always lowercase; only the OS
/// label supports titlecase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Casing {
    /// `linux`, `darwin`, `windows`.
    #[default]
    Lowercase,
    /// `Linux`, `Darwin`, `Windows`.
    Titlecase,
}

/// Architecture-emulation configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ArchEmulation {
    /// Treat `darwin/amd64` assets as usable on `darwin/arm64` via
    /// Rosetta 2 when no native arm64 asset exists.
    #[serde(default)]
    pub rosetta2: bool,
}

/// Archive unpacking configuration, consumed by installers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnpackConfig {
    /// Number of leading path components stripped while extracting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_components: Option<u32>,
}

/// Checksum acquisition and verification configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecksumConfig {
    /// Digest algorithm. Defaults to sha256.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<HashAlgorithm>,

    /// Checksum-manifest filename template. Manifest templates use only
    /// `${NAME}`/`${TAG}`/`${VERSION}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Checksums embedded per version key, sorted by filename.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub embedded: BTreeMap<String, Vec<EmbeddedChecksum>>,
}

/// One embedded `filename -> hash` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedChecksum {
    /// Asset filename exactly as released.
    pub filename: String,
    /// Hex digest of the asset.
    pub hash: String,
}

impl InstallSpec {
    /// Load a spec from a TOML document on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid spec.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let spec: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(spec)
    }

    /// Parse a spec from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid spec document.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse install spec")
    }

    /// Split the `repository` field into `(owner, name)`, validating its
    /// shape.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::MissingRepository`] or
    /// [`SpecError::InvalidRepository`].
    pub fn parse_repository(&self) -> Result<(&str, &str), SpecError> {
        let repo = self
            .repository
            .as_deref()
            .ok_or(SpecError::MissingRepository)?;
        if !REPOSITORY_RE.is_match(repo) {
            return Err(SpecError::InvalidRepository(repo.to_string()));
        }
        repo.split_once('/')
            .ok_or_else(|| SpecError::InvalidRepository(repo.to_string()))
    }

    /// Project name, defaulting to the repository tail when `name` is
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::MissingName`] when neither field is usable.
    pub fn effective_name(&self) -> Result<&str, SpecError> {
        if let Some(name) = self.name.as_deref() {
            return Ok(name);
        }
        match self.parse_repository() {
            Ok((_, name)) => Ok(name),
            Err(_) => Err(SpecError::MissingName),
        }
    }

    /// Checksum algorithm, falling back to the sha256 default.
    pub fn checksum_algorithm(&self) -> HashAlgorithm {
        self.checksums
            .as_ref()
            .and_then(|c| c.algorithm)
            .unwrap_or_default()
    }

    /// Look up an embedded checksum for `filename` under the exact
    /// `version` key.
    pub fn embedded_checksum(&self, version: &str, filename: &str) -> Option<&str> {
        self.checksums
            .as_ref()?
            .embedded
            .get(version)?
            .iter()
            .find(|e| e.filename == filename)
            .map(|e| e.hash.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_validation() {
        let mut spec = InstallSpec {
            repository: Some("cli/cli".to_string()),
            ..Default::default()
        };
        assert_eq!(spec.parse_repository().unwrap(), ("cli", "cli"));

        spec.repository = Some("not a repo".to_string());
        assert!(matches!(
            spec.parse_repository(),
            Err(SpecError::InvalidRepository(_))
        ));

        spec.repository = None;
        assert!(matches!(
            spec.parse_repository(),
            Err(SpecError::MissingRepository)
        ));
    }

    #[test]
    fn name_falls_back_to_repository_tail() {
        let spec = InstallSpec {
            repository: Some("owner/tool".to_string()),
            ..Default::default()
        };
        assert_eq!(spec.effective_name().unwrap(), "tool");

        let named = InstallSpec {
            name: Some("custom".to_string()),
            repository: Some("owner/tool".to_string()),
            ..Default::default()
        };
        assert_eq!(named.effective_name().unwrap(), "custom");

        let empty = InstallSpec::default();
        assert!(matches!(
            empty.effective_name(),
            Err(SpecError::MissingName)
        ));
    }

    #[test]
    fn parses_full_document() {
        let text = r#"
name = "testapp"
repository = "example/testapp"
version = "v1.0.0"

[asset]
template = "${NAME}_${OS}_${ARCH}${EXT}"
default_extension = ".tar.gz"

[[asset.rules]]
when = { arch = "amd64" }
arch = "x86_64"

[[asset.rules]]
when = { os = "windows" }
ext = ".zip"

[checksums]
algorithm = "sha256"
template = "${NAME}_${VERSION}_checksums.txt"

[[supported_platforms]]
os = "linux"
arch = "amd64"

[[supported_platforms]]
os = "darwin"
arch = "arm64"
"#;
        let spec = InstallSpec::from_toml(text).unwrap();
        let asset = spec.asset.as_ref().unwrap();
        assert_eq!(asset.rules.len(), 2);
        assert_eq!(asset.rules[0].when.arch.as_deref(), Some("amd64"));
        assert_eq!(asset.rules[1].ext.as_deref(), Some(".zip"));
        assert_eq!(spec.supported_platforms.as_ref().unwrap().len(), 2);
        assert_eq!(spec.checksum_algorithm(), HashAlgorithm::Sha256);
    }

    #[test]
    fn embedded_lookup_is_exact_on_version_key() {
        let text = r#"
repository = "owner/tool"

[checksums]
[[checksums.embedded."v1.0.0"]]
filename = "tool_linux_amd64.tar.gz"
hash = "abc123"
"#;
        let spec = InstallSpec::from_toml(text).unwrap();
        assert_eq!(
            spec.embedded_checksum("v1.0.0", "tool_linux_amd64.tar.gz"),
            Some("abc123")
        );
        assert_eq!(spec.embedded_checksum("1.0.0", "tool_linux_amd64.tar.gz"), None);
        assert_eq!(spec.embedded_checksum("v1.0.0", "other"), None);
    }
}
