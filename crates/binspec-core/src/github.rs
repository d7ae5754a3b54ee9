//! Release-host client: release metadata, asset text, asset digests.
//!
//! The hosting API is consumed, never produced. An access token is read
//! from the process environment and attached only to requests that target
//! the hosting service's own domains; asset downloads may be redirected to
//! third-party CDNs, which must never see the token.

use binspec_schema::{HashAlgorithm, ReleaseDigest};
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::AcquireError;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";

/// A release fetched from the hosting API.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    /// The release tag, e.g. `v1.2.3`.
    pub tag_name: String,
    /// Assets attached to the release.
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

/// One release asset record.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubAsset {
    /// Asset filename.
    pub name: String,
    /// Direct download locator.
    pub browser_download_url: String,
    /// Service-computed digest in `algorithm:hexdigest` form, when present.
    #[serde(default)]
    pub digest: Option<String>,
}

impl GithubAsset {
    /// The authoritative digest for this asset, when the service provides a
    /// well-formed `sha256:` one.
    pub fn sha256_digest(&self) -> Option<ReleaseDigest> {
        ReleaseDigest::parse_sha256(self.digest.as_deref()?)
    }
}

/// HTTP client for the release host.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    client: Client,
    api_base: String,
    download_base: String,
    token: Option<String>,
}

impl ReleaseClient {
    /// Client against the real hosting service, with the token taken from
    /// `GITHUB_TOKEN` or `GH_TOKEN` when set.
    pub fn new(client: Client) -> Self {
        let token = std::env::var("GITHUB_TOKEN")
            .or_else(|_| std::env::var("GH_TOKEN"))
            .ok()
            .filter(|t| !t.is_empty());
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            token,
        }
    }

    /// Client with overridden endpoints, for tests against a local server.
    pub fn with_bases(client: Client, api_base: &str, download_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            download_base: download_base.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT);
        // Token only for the hosting service's own domains.
        let is_host_domain = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
            .is_some_and(|h| h == "github.com" || h.ends_with(".github.com"));
        if is_host_domain {
            if let Some(token) = &self.token {
                req = req.bearer_auth(token);
            }
        }
        req
    }

    /// Fetch release metadata for `tag`, or the latest release when `tag`
    /// is `latest`.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Status`] for non-success responses and
    /// [`AcquireError::Http`] for transport failures.
    pub async fn fetch_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<GithubRelease, AcquireError> {
        let url = if tag == "latest" {
            format!("{}/repos/{owner}/{repo}/releases/latest", self.api_base)
        } else {
            format!("{}/repos/{owner}/{repo}/releases/tags/{tag}", self.api_base)
        };
        debug!(url, "fetching release metadata");
        let resp = self
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AcquireError::Status {
                url,
                status: resp.status(),
            });
        }
        Ok(resp.json().await?)
    }

    /// Download a named release asset as text (checksum manifests).
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Status`] for non-success responses and
    /// [`AcquireError::Http`] for transport failures.
    pub async fn download_asset_text(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        filename: &str,
    ) -> Result<String, AcquireError> {
        let url = format!(
            "{}/{owner}/{repo}/releases/download/{tag}/{filename}",
            self.download_base
        );
        debug!(url, "downloading release asset");
        let resp = self.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(AcquireError::Status {
                url,
                status: resp.status(),
            });
        }
        Ok(resp.text().await?)
    }

    /// Stream an asset body and return its hex digest without keeping the
    /// body in memory.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Status`] for non-success responses and
    /// [`AcquireError::Http`] for transport failures mid-stream.
    pub async fn download_and_digest(
        &self,
        url: &str,
        algorithm: HashAlgorithm,
    ) -> Result<String, AcquireError> {
        let resp = self.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(AcquireError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }
        let mut hasher = crate::digest::Hasher::new(algorithm);
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            hasher.update(&chunk?);
        }
        Ok(hasher.finalize_hex())
    }
}
