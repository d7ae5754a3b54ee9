//! Shared types and spec document model for binspec.
//!
//! A spec describes how a project's release binaries are named and verified.
//! This crate is passive data only; resolution and checksum logic live in
//! `binspec-core`.

pub mod hash;
pub mod platform;
pub mod spec;

// Re-exports
pub use hash::{HashAlgorithm, ReleaseDigest};
pub use platform::{ALL_ARCH, ALL_OS, Arch, Os};
pub use spec::{
    ArchEmulation, AssetConfig, AssetRule, BinaryEntry, Casing, ChecksumConfig, EmbeddedChecksum,
    InstallSpec, NamingConvention, Platform, RuleCondition, SpecError, UnpackConfig,
};
