//! Rule resolution: from a requested platform to effective naming state.
//!
//! Rules are cumulative, not first-match-wins. Every rule whose `when`
//! clause matches the requested platform applies in declaration order, each
//! overlaying only the fields it sets. `when` clauses are matched against
//! the original platform pair, which is kept apart from the mutable state so
//! that a rule rewriting the OS label cannot change what later rules match
//! against.

use binspec_schema::spec::{AssetConfig, BinaryEntry, Casing};
use binspec_schema::{Arch, Os};

/// Effective naming state for one platform after all rules have applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// OS label as it appears in the filename.
    pub os: String,
    /// Architecture label as it appears in the filename.
    pub arch: String,
    /// Extension, including its leading dot when configured that way.
    pub ext: String,
    /// Template to interpolate, when either the asset config or a rule
    /// provides one.
    pub template: Option<String>,
    /// Binaries contained in the asset.
    pub binaries: Vec<BinaryEntry>,
}

fn non_empty(value: Option<&String>) -> Option<&String> {
    value.filter(|s| !s.is_empty())
}

/// Apply naming-convention casing and all matching rules for `(os, arch)`.
pub fn resolve_asset(asset: &AssetConfig, os: Os, arch: Arch) -> ResolvedAsset {
    let os_casing = asset
        .naming_convention
        .as_ref()
        .and_then(|n| n.os)
        .unwrap_or_default();

    // Casing is applied once, before any rule. Rules may replace the label
    // outright afterwards.
    let os_label = match os_casing {
        Casing::Lowercase => os.as_str().to_string(),
        Casing::Titlecase => os.titlecase().to_string(),
    };

    let mut state = ResolvedAsset {
        os: os_label,
        arch: arch.as_str().to_string(),
        ext: asset.default_extension.clone().unwrap_or_default(),
        template: asset.template.clone(),
        binaries: asset.binaries.clone(),
    };

    for rule in &asset.rules {
        // Matching uses the original platform identifiers, never the
        // rewritten labels in `state`.
        let os_ok = non_empty(rule.when.os.as_ref()).is_none_or(|want| want == os.as_str());
        let arch_ok = non_empty(rule.when.arch.as_ref()).is_none_or(|want| want == arch.as_str());
        if !(os_ok && arch_ok) {
            continue;
        }

        if let Some(os_override) = non_empty(rule.os.as_ref()) {
            state.os = os_override.clone();
        }
        if let Some(arch_override) = non_empty(rule.arch.as_ref()) {
            state.arch = arch_override.clone();
        }
        if let Some(ext_override) = non_empty(rule.ext.as_ref()) {
            state.ext = ext_override.clone();
        }
        if let Some(template_override) = non_empty(rule.template.as_ref()) {
            state.template = Some(template_override.clone());
        }
        if let Some(binaries_override) = rule.binaries.as_ref() {
            state.binaries = binaries_override.clone();
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use binspec_schema::spec::{AssetRule, NamingConvention, RuleCondition};

    fn asset_with_rules(rules: Vec<AssetRule>) -> AssetConfig {
        AssetConfig {
            template: Some("${NAME}_${OS}_${ARCH}${EXT}".to_string()),
            default_extension: Some(".tar.gz".to_string()),
            rules,
            naming_convention: Some(NamingConvention {
                os: Some(Casing::Titlecase),
            }),
            ..Default::default()
        }
    }

    fn arch_rename_rule() -> AssetRule {
        AssetRule {
            when: RuleCondition {
                arch: Some("amd64".to_string()),
                ..Default::default()
            },
            arch: Some("x86_64".to_string()),
            ..Default::default()
        }
    }

    fn windows_zip_rule() -> AssetRule {
        AssetRule {
            when: RuleCondition {
                os: Some("windows".to_string()),
                ..Default::default()
            },
            ext: Some(".zip".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn rules_accumulate_across_independent_fields() {
        let asset = asset_with_rules(vec![arch_rename_rule(), windows_zip_rule()]);

        let win = resolve_asset(&asset, Os::Windows, Arch::Amd64);
        assert_eq!(win.os, "Windows");
        assert_eq!(win.arch, "x86_64");
        assert_eq!(win.ext, ".zip");

        let linux = resolve_asset(&asset, Os::Linux, Arch::Amd64);
        assert_eq!(linux.os, "Linux");
        assert_eq!(linux.arch, "x86_64");
        assert_eq!(linux.ext, ".tar.gz");

        let win386 = resolve_asset(&asset, Os::Windows, Arch::I386);
        assert_eq!(win386.arch, "386");
        assert_eq!(win386.ext, ".zip");
    }

    #[test]
    fn when_matches_original_values_not_rewritten_ones() {
        // First rule renames amd64 to x86_64; the second still matches the
        // original "amd64" identifier and wins for the ext field.
        let followup = AssetRule {
            when: RuleCondition {
                arch: Some("amd64".to_string()),
                ..Default::default()
            },
            ext: Some(".tgz".to_string()),
            ..Default::default()
        };
        // A rule keyed on the rewritten label must never fire.
        let phantom = AssetRule {
            when: RuleCondition {
                arch: Some("x86_64".to_string()),
                ..Default::default()
            },
            ext: Some(".bogus".to_string()),
            ..Default::default()
        };
        let asset = asset_with_rules(vec![arch_rename_rule(), followup, phantom]);

        let resolved = resolve_asset(&asset, Os::Linux, Arch::Amd64);
        assert_eq!(resolved.arch, "x86_64");
        assert_eq!(resolved.ext, ".tgz");
    }

    #[test]
    fn later_rule_overrides_earlier_state() {
        let broad = AssetRule {
            ext: Some(".tar.xz".to_string()),
            ..Default::default()
        };
        let narrow = windows_zip_rule();
        let asset = asset_with_rules(vec![broad, narrow]);

        assert_eq!(resolve_asset(&asset, Os::Windows, Arch::Arm64).ext, ".zip");
        assert_eq!(resolve_asset(&asset, Os::Linux, Arch::Arm64).ext, ".tar.xz");
    }

    #[test]
    fn template_and_binaries_replacement() {
        let rule = AssetRule {
            when: RuleCondition {
                os: Some("windows".to_string()),
                ..Default::default()
            },
            template: Some("${NAME}-${OS}.exe".to_string()),
            binaries: Some(vec![BinaryEntry {
                name: "tool.exe".to_string(),
                path: "tool.exe".to_string(),
            }]),
            ..Default::default()
        };
        let asset = asset_with_rules(vec![rule]);

        let win = resolve_asset(&asset, Os::Windows, Arch::Amd64);
        assert_eq!(win.template.as_deref(), Some("${NAME}-${OS}.exe"));
        assert_eq!(win.binaries.len(), 1);

        let linux = resolve_asset(&asset, Os::Linux, Arch::Amd64);
        assert_eq!(linux.template.as_deref(), Some("${NAME}_${OS}_${ARCH}${EXT}"));
        assert!(linux.binaries.is_empty());
    }
}
