//! Install-time checksum verification.
//!
//! Resolution order: embedded checksums first, then a freshly downloaded
//! manifest when the spec configures one. What happens when neither yields a
//! hash is a per-call-site policy: the standalone `verify` command treats it
//! as a hard failure, while the install flow warns and proceeds unverified.

use std::path::Path;

use binspec_schema::spec::InstallSpec;
use tracing::warn;

use crate::digest::digest_file;
use crate::error::VerifyError;
use crate::github::ReleaseClient;
use crate::manifest::parse_manifest;
use crate::template::{interpolate, manifest_vars};

/// What to do when no checksum can be resolved for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingChecksumPolicy {
    /// Fail verification outright.
    Fail,
    /// Warn and let the caller proceed unverified.
    Warn,
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The file matched the expected digest.
    Verified {
        /// The digest that matched, lowercase hex.
        digest: String,
    },
    /// No checksum was available and the policy allowed skipping.
    Skipped,
}

/// Verifies downloaded release assets against a spec.
#[derive(Debug)]
pub struct Verifier<'a> {
    spec: &'a InstallSpec,
    client: &'a ReleaseClient,
}

impl<'a> Verifier<'a> {
    /// Build a verifier over `spec`, using `client` for the manifest
    /// fallback.
    pub fn new(spec: &'a InstallSpec, client: &'a ReleaseClient) -> Self {
        Self { spec, client }
    }

    /// Verify `local_path` against the checksum recorded for `filename`
    /// under `version`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Mismatch`] when the digests differ (always
    /// fatal, with both values reported), [`VerifyError::NoChecksum`] when
    /// nothing was found and the policy is [`MissingChecksumPolicy::Fail`],
    /// and acquisition/IO errors from the manifest fallback or file read.
    pub async fn verify(
        &self,
        version: &str,
        local_path: &Path,
        filename: &str,
        policy: MissingChecksumPolicy,
    ) -> Result<VerifyOutcome, VerifyError> {
        let Some(expected) = self.resolve_expected(version, filename).await? else {
            return match policy {
                MissingChecksumPolicy::Fail => Err(VerifyError::NoChecksum {
                    filename: filename.to_string(),
                    version: version.to_string(),
                }),
                MissingChecksumPolicy::Warn => {
                    warn!(filename, version, "no checksum available, skipping verification");
                    Ok(VerifyOutcome::Skipped)
                }
            };
        };

        let algorithm = self.spec.checksum_algorithm();
        let actual = digest_file(algorithm, local_path).await?;
        if actual.eq_ignore_ascii_case(&expected) {
            Ok(VerifyOutcome::Verified { digest: actual })
        } else {
            Err(VerifyError::Mismatch {
                filename: filename.to_string(),
                expected,
                actual,
            })
        }
    }

    /// Embedded lookup, then manifest download. `Ok(None)` means no
    /// checksum exists anywhere.
    async fn resolve_expected(
        &self,
        version: &str,
        filename: &str,
    ) -> Result<Option<String>, VerifyError> {
        if let Some(hash) = self.spec.embedded_checksum(version, filename) {
            return Ok(Some(hash.to_string()));
        }

        let Some(template) = self
            .spec
            .checksums
            .as_ref()
            .and_then(|c| c.template.as_deref())
            .filter(|t| !t.is_empty())
        else {
            return Ok(None);
        };
        let Ok((owner, repo)) = self.spec.parse_repository() else {
            return Ok(None);
        };
        let Ok(name) = self.spec.effective_name() else {
            return Ok(None);
        };

        // Per-asset manifests (${ASSET_FILENAME}) are resolvable here since
        // the asset filename is known.
        let mut vars = manifest_vars(name, version);
        vars.insert("ASSET_FILENAME", filename.to_string());
        let manifest_name = interpolate(template, &vars);

        let text = self
            .client
            .download_asset_text(owner, repo, version, &manifest_name)
            .await
            .map_err(VerifyError::Acquire)?;
        // Verification looks the filename up unfiltered: the manifest may
        // legitimately list assets this spec cannot enumerate.
        let entries = parse_manifest(&text, &manifest_name).map_err(VerifyError::Acquire)?;
        Ok(entries
            .into_iter()
            .find(|e| e.filename == filename)
            .map(|e| e.hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binspec_schema::spec::{ChecksumConfig, EmbeddedChecksum};
    use mockito::Server;
    use reqwest::Client;
    use std::collections::BTreeMap;
    use std::io::Write;

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn spec_with_embedded(hash: &str) -> InstallSpec {
        InstallSpec {
            name: Some("tool".to_string()),
            repository: Some("example/tool".to_string()),
            checksums: Some(ChecksumConfig {
                embedded: BTreeMap::from([(
                    "v1.0.0".to_string(),
                    vec![EmbeddedChecksum {
                        filename: "tool.tar.gz".to_string(),
                        hash: hash.to_string(),
                    }],
                )]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn hello_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file
    }

    #[tokio::test]
    async fn verifies_against_embedded_checksum() {
        let spec = spec_with_embedded(HELLO_SHA256);
        let client = ReleaseClient::with_bases(Client::new(), "http://unused", "http://unused");
        let file = hello_file();

        let outcome = Verifier::new(&spec, &client)
            .verify("v1.0.0", file.path(), "tool.tar.gz", MissingChecksumPolicy::Fail)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            VerifyOutcome::Verified {
                digest: HELLO_SHA256.to_string()
            }
        );
    }

    #[tokio::test]
    async fn comparison_is_case_insensitive() {
        let spec = spec_with_embedded(&HELLO_SHA256.to_uppercase());
        let client = ReleaseClient::with_bases(Client::new(), "http://unused", "http://unused");
        let file = hello_file();

        let outcome = Verifier::new(&spec, &client)
            .verify("v1.0.0", file.path(), "tool.tar.gz", MissingChecksumPolicy::Fail)
            .await
            .unwrap();
        assert!(matches!(outcome, VerifyOutcome::Verified { .. }));
    }

    #[tokio::test]
    async fn mismatch_reports_both_digests() {
        let spec = spec_with_embedded(HELLO_SHA256);
        let client = ReleaseClient::with_bases(Client::new(), "http://unused", "http://unused");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // Single-byte mutation of the verified content.
        file.write_all(b"hello worle").unwrap();

        let err = Verifier::new(&spec, &client)
            .verify("v1.0.0", file.path(), "tool.tar.gz", MissingChecksumPolicy::Fail)
            .await
            .unwrap_err();
        match err {
            VerifyError::Mismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, HELLO_SHA256);
                assert_ne!(actual, HELLO_SHA256);
            }
            other => panic!("expected mismatch, got {other}"),
        }
    }

    #[tokio::test]
    async fn missing_checksum_policy_decides_outcome() {
        let spec = InstallSpec {
            name: Some("tool".to_string()),
            repository: Some("example/tool".to_string()),
            ..Default::default()
        };
        let client = ReleaseClient::with_bases(Client::new(), "http://unused", "http://unused");
        let file = hello_file();
        let verifier = Verifier::new(&spec, &client);

        let err = verifier
            .verify("v1.0.0", file.path(), "tool.tar.gz", MissingChecksumPolicy::Fail)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::NoChecksum { .. }));

        let outcome = verifier
            .verify("v1.0.0", file.path(), "tool.tar.gz", MissingChecksumPolicy::Warn)
            .await
            .unwrap();
        assert_eq!(outcome, VerifyOutcome::Skipped);
    }

    #[tokio::test]
    async fn falls_back_to_manifest_download() {
        let mut server = Server::new_async().await;
        let manifest = format!("{HELLO_SHA256} tool.tar.gz\n");
        let _m = server
            .mock(
                "GET",
                "/example/tool/releases/download/v1.0.0/tool_1.0.0_checksums.txt",
            )
            .with_status(200)
            .with_body(manifest)
            .create_async()
            .await;

        let spec = InstallSpec {
            name: Some("tool".to_string()),
            repository: Some("example/tool".to_string()),
            checksums: Some(ChecksumConfig {
                template: Some("${NAME}_${VERSION}_checksums.txt".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let client = ReleaseClient::with_bases(Client::new(), &server.url(), &server.url());
        let file = hello_file();

        let outcome = Verifier::new(&spec, &client)
            .verify("v1.0.0", file.path(), "tool.tar.gz", MissingChecksumPolicy::Fail)
            .await
            .unwrap();
        assert!(matches!(outcome, VerifyOutcome::Verified { .. }));
    }
}
