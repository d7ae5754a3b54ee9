//! Core library for binspec: the asset-resolution and checksum-trust
//! engine.
//!
//! Given an install spec, this crate decides which release-asset filename
//! applies to a platform, acquires and embeds checksums for a version, and
//! verifies downloaded files. The generated shell installer must reach the
//! same decisions from the same spec, so resolution logic here is pure and
//! deterministic; only checksum acquisition touches the network.

pub mod digest;
pub mod embed;
pub mod error;
pub mod filename;
pub mod github;
pub mod manifest;
pub mod persist;
pub mod resolve;
pub mod template;
pub mod verify;

pub use embed::{ChecksumSource, EmbedOutcome, embed_checksums};
pub use error::{AcquireError, ConfigError, VerifyError};
pub use filename::FilenameGenerator;
pub use github::ReleaseClient;
pub use verify::{MissingChecksumPolicy, Verifier, VerifyOutcome};

/// User Agent string for all HTTP requests.
pub const USER_AGENT: &str = concat!("binspec/", env!("CARGO_PKG_VERSION"));
