//! binspec - install spec tooling
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Thin command-line surface over `binspec-core`: the argument structs here
//! map one-to-one onto core operations and carry no logic of their own.

pub mod cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// User Agent string (re-exported from binspec_core)
pub use binspec_core::USER_AGENT;

#[derive(Debug, Parser)]
#[command(name = "binspec")]
#[command(author, version, about = "Resolve, embed, and verify release-binary checksums")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Embed release checksums into a spec file
    Embed {
        /// Path to the spec file
        spec: PathBuf,
        /// Version tag to embed for (defaults to the spec's version, then "latest")
        #[arg(long)]
        version: Option<String>,
        /// How to acquire the checksums
        #[arg(long, value_enum, default_value_t = EmbedMode::Download)]
        mode: EmbedMode,
        /// Local checksum manifest (checksum-file mode only)
        #[arg(long, required_if_eq("mode", "checksum-file"))]
        checksum_file: Option<PathBuf>,
        /// Print the patched spec to stdout instead of rewriting the file
        #[arg(long)]
        dry_run: bool,
    },
    /// Verify a downloaded asset against a spec's checksums
    Verify {
        /// Path to the spec file
        spec: PathBuf,
        /// The downloaded file to verify
        file: PathBuf,
        /// Version tag to look up (defaults to the spec's version)
        #[arg(long)]
        version: Option<String>,
        /// Asset filename as released (defaults to the file's basename)
        #[arg(long)]
        filename: Option<String>,
        /// Warn and succeed when no checksum is available, instead of failing
        #[arg(long)]
        skip_missing: bool,
    },
    /// List every asset filename a spec can produce
    Filenames {
        /// Path to the spec file
        spec: PathBuf,
        /// Version tag to generate for (defaults to the spec's version)
        #[arg(long)]
        version: Option<String>,
        /// Print only the filename for the platform this binary runs on
        #[arg(long)]
        current: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Checksum acquisition mode, mirroring `binspec_core::ChecksumSource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedMode {
    /// Download the manifest named by the spec's checksum template
    Download,
    /// Read a local checksum manifest
    ChecksumFile,
    /// Compute checksums from the release assets themselves
    Calculate,
}
