//! Closed platform enumerations.
//!
//! Release projects name the same platform inconsistently (`amd64` vs
//! `x86_64`, `darwin` vs `macOS`), so the spec keeps a small closed set of
//! canonical identifiers here and lets [`AssetRule`](crate::spec::AssetRule)
//! overrides rewrite the *label* per project without widening the set.

use serde::{Deserialize, Serialize};

/// Operating system identifier used by install specs.
///
/// The string forms follow the Go toolchain convention (`linux`, `darwin`,
/// `windows`), which is what the overwhelming majority of release archives
/// are named after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux-based operating systems.
    Linux,
    /// Apple macOS, named after its kernel as Go and Rust projects do.
    Darwin,
    /// Microsoft Windows.
    Windows,
    /// FreeBSD.
    Freebsd,
    /// OpenBSD.
    Openbsd,
    /// NetBSD.
    Netbsd,
}

/// CPU architecture identifier used by install specs.
///
/// As with [`Os`], the canonical spellings are the Go convention (`amd64`,
/// `arm64`, `386`); per-project rules rewrite them where a release uses
/// `x86_64`/`aarch64` style names instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// Intel/AMD 64-bit.
    Amd64,
    /// ARM 64-bit.
    Arm64,
    /// Intel 32-bit.
    #[serde(rename = "386")]
    I386,
    /// ARM 32-bit.
    Arm,
    /// PowerPC 64-bit little-endian.
    Ppc64le,
    /// IBM Z.
    S390x,
    /// RISC-V 64-bit.
    Riscv64,
}

/// The exhaustive OS set iterated when a spec lists no supported platforms.
pub const ALL_OS: &[Os] = &[
    Os::Linux,
    Os::Darwin,
    Os::Windows,
    Os::Freebsd,
    Os::Openbsd,
    Os::Netbsd,
];

/// The exhaustive architecture set iterated when a spec lists no supported
/// platforms.
pub const ALL_ARCH: &[Arch] = &[
    Arch::Amd64,
    Arch::Arm64,
    Arch::I386,
    Arch::Arm,
    Arch::Ppc64le,
    Arch::S390x,
    Arch::Riscv64,
];

impl Os {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Freebsd => "freebsd",
            Self::Openbsd => "openbsd",
            Self::Netbsd => "netbsd",
        }
    }

    /// Titlecased name (`Linux`, `Darwin`, `Windows`), for specs whose
    /// releases capitalize the OS segment.
    pub fn titlecase(&self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::Darwin => "Darwin",
            Self::Windows => "Windows",
            Self::Freebsd => "Freebsd",
            Self::Openbsd => "Openbsd",
            Self::Netbsd => "Netbsd",
        }
    }

    /// The OS the current binary was compiled for.
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::Darwin
        }
        #[cfg(target_os = "windows")]
        {
            Self::Windows
        }
        #[cfg(target_os = "freebsd")]
        {
            Self::Freebsd
        }
        #[cfg(target_os = "openbsd")]
        {
            Self::Openbsd
        }
        #[cfg(target_os = "netbsd")]
        {
            Self::Netbsd
        }
        #[cfg(not(any(
            target_os = "macos",
            target_os = "windows",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd"
        )))]
        {
            Self::Linux
        }
    }
}

impl Arch {
    /// Canonical lowercase name. Architectures have no titlecase form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::I386 => "386",
            Self::Arm => "arm",
            Self::Ppc64le => "ppc64le",
            Self::S390x => "s390x",
            Self::Riscv64 => "riscv64",
        }
    }

    /// The architecture the current binary was compiled for.
    pub fn current() -> Self {
        #[cfg(target_arch = "aarch64")]
        {
            Self::Arm64
        }
        #[cfg(target_arch = "x86")]
        {
            Self::I386
        }
        #[cfg(not(any(target_arch = "aarch64", target_arch = "x86")))]
        {
            Self::Amd64
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" | "osx" => Ok(Self::Darwin),
            "windows" => Ok(Self::Windows),
            "freebsd" => Ok(Self::Freebsd),
            "openbsd" => Ok(Self::Openbsd),
            "netbsd" => Ok(Self::Netbsd),
            _ => Err(format!("Unknown operating system: {s}")),
        }
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amd64" | "x86_64" => Ok(Self::Amd64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "386" | "i386" => Ok(Self::I386),
            "arm" => Ok(Self::Arm),
            "ppc64le" => Ok(Self::Ppc64le),
            "s390x" => Ok(Self::S390x),
            "riscv64" => Ok(Self::Riscv64),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}
