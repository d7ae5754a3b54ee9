//! Placeholder interpolation for asset and manifest templates.
//!
//! Interpolation never fails: known placeholders are replaced with their
//! value and placeholders outside the variable set for a call are replaced
//! with the empty string, never left literal. The generated shell installer
//! substitutes templates the same way, so this behavior must not drift.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("valid regex"));

/// Variable set for one interpolation call.
pub type Vars = HashMap<&'static str, String>;

/// Substitute `${VAR}` placeholders in `template`.
///
/// Placeholders absent from `vars` vanish. Text outside placeholders is
/// copied verbatim.
pub fn interpolate(template: &str, vars: &Vars) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Split a resolved version string into its `(TAG, VERSION)` pair.
///
/// `TAG` is the string exactly as resolved; `VERSION` is `TAG` with exactly
/// one leading `v` stripped, a no-op when no prefix is present.
pub fn split_tag(tag: &str) -> (&str, &str) {
    (tag, tag.strip_prefix('v').unwrap_or(tag))
}

/// Does the raw template text contain `${name}` before interpolation?
pub fn has_placeholder(template: &str, name: &str) -> bool {
    PLACEHOLDER_RE
        .captures_iter(template)
        .any(|c| &c[1] == name)
}

/// Variables available to asset filename templates.
pub fn asset_vars(name: &str, tag: &str, os: &str, arch: &str, ext: &str) -> Vars {
    let (tag, version) = split_tag(tag);
    HashMap::from([
        ("NAME", name.to_string()),
        ("TAG", tag.to_string()),
        ("VERSION", version.to_string()),
        ("OS", os.to_string()),
        ("ARCH", arch.to_string()),
        ("EXT", ext.to_string()),
    ])
}

/// Variables available to checksum-manifest templates. Platform placeholders
/// are deliberately absent: one manifest covers all platforms.
pub fn manifest_vars(name: &str, tag: &str) -> Vars {
    let (tag, version) = split_tag(tag);
    HashMap::from([
        ("NAME", name.to_string()),
        ("TAG", tag.to_string()),
        ("VERSION", version.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_placeholders() {
        let vars = asset_vars("tool", "v1.2.3", "linux", "amd64", ".tar.gz");
        assert_eq!(
            interpolate("${NAME}_${VERSION}_${OS}_${ARCH}${EXT}", &vars),
            "tool_1.2.3_linux_amd64.tar.gz"
        );
    }

    #[test]
    fn unknown_placeholders_vanish() {
        let vars = manifest_vars("tool", "v1.2.3");
        assert_eq!(
            interpolate("${NAME}-${NOPE}-${VERSION}${OS}", &vars),
            "tool--1.2.3"
        );
    }

    #[test]
    fn tag_and_version_split() {
        assert_eq!(split_tag("v1.2.3"), ("v1.2.3", "1.2.3"));
        assert_eq!(split_tag("1.2.3"), ("1.2.3", "1.2.3"));
        // Exactly one leading 'v' is stripped.
        assert_eq!(split_tag("vv1.0"), ("vv1.0", "v1.0"));
    }

    #[test]
    fn tag_keeps_prefix_in_templates() {
        let vars = manifest_vars("tool", "v2.0.0");
        assert_eq!(
            interpolate("${NAME}_${TAG}_checksums.txt", &vars),
            "tool_v2.0.0_checksums.txt"
        );
    }

    #[test]
    fn placeholder_scan_sees_raw_text() {
        assert!(has_placeholder("${ASSET_FILENAME}.sha256", "ASSET_FILENAME"));
        assert!(!has_placeholder("checksums.txt", "ASSET_FILENAME"));
        assert!(!has_placeholder("$ASSET_FILENAME", "ASSET_FILENAME"));
    }
}
