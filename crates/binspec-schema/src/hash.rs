//! Hash algorithm selection and digest validation.

use serde::{Deserialize, Serialize};

/// Checksum algorithm an install spec may select.
///
/// `sha256` is the default and by far the most common; the others exist for
/// projects that still publish legacy manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256 (default).
    #[default]
    Sha256,
    /// SHA-512.
    Sha512,
    /// SHA-1, legacy.
    Sha1,
    /// MD5, legacy.
    Md5,
}

impl HashAlgorithm {
    /// Lowercase algorithm name as written in spec documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
        }
    }

    /// Length of a hex-encoded digest for this algorithm.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha512 => 128,
            Self::Sha1 => 40,
            Self::Md5 => 32,
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "sha1" => Ok(Self::Sha1),
            "md5" => Ok(Self::Md5),
            _ => Err(format!("Unknown hash algorithm: {s}")),
        }
    }
}

/// A digest attached to release-asset metadata by the hosting service,
/// in `algorithm:hexdigest` form.
///
/// Only `sha256:` digests are recognized as authoritative; anything else is
/// ignored and the asset body is hashed locally instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDigest(String);

impl ReleaseDigest {
    /// Parse an `algorithm:hexdigest` string, accepting only well-formed
    /// `sha256:` digests. Returns `None` for any other algorithm or for a
    /// malformed hex payload.
    pub fn parse_sha256(s: &str) -> Option<Self> {
        let hexpart = s.strip_prefix("sha256:")?;
        if hexpart.len() == 64 && hexpart.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(hexpart.to_lowercase()))
        } else {
            None
        }
    }

    /// The bare lowercase hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReleaseDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_sha256_prefix_only() {
        let hex = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        let d = ReleaseDigest::parse_sha256(&format!("sha256:{hex}")).unwrap();
        assert_eq!(d.as_str(), hex);

        assert!(ReleaseDigest::parse_sha256(&format!("sha512:{hex}")).is_none());
        assert!(ReleaseDigest::parse_sha256(hex).is_none());
        assert!(ReleaseDigest::parse_sha256("sha256:abc").is_none());
    }

    #[test]
    fn digest_is_lowercased() {
        let d = ReleaseDigest::parse_sha256(
            "sha256:B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9",
        )
        .unwrap();
        assert!(d.as_str().chars().all(|c| !c.is_ascii_uppercase()));
    }

    #[test]
    fn hex_lengths() {
        assert_eq!(HashAlgorithm::Sha256.hex_len(), 64);
        assert_eq!(HashAlgorithm::Md5.hex_len(), 32);
    }
}
