//! Filename generation over the resolved naming state.

use std::collections::BTreeSet;

use binspec_schema::platform::{ALL_ARCH, ALL_OS};
use binspec_schema::spec::{InstallSpec, Platform};
use binspec_schema::{Arch, Os};

use crate::error::ConfigError;
use crate::resolve::{ResolvedAsset, resolve_asset};
use crate::template::{asset_vars, interpolate};

/// Generates release-asset filenames for one spec at one version.
#[derive(Debug)]
pub struct FilenameGenerator<'a> {
    spec: &'a InstallSpec,
    name: String,
    tag: String,
}

impl<'a> FilenameGenerator<'a> {
    /// Build a generator for `tag`. Fails when the spec cannot yield a
    /// project name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Spec`] when neither `name` nor `repository`
    /// is present.
    pub fn new(spec: &'a InstallSpec, tag: &str) -> Result<Self, ConfigError> {
        let name = spec.effective_name()?.to_string();
        Ok(Self {
            spec,
            name,
            tag: tag.to_string(),
        })
    }

    /// Resolve the naming state for one platform without interpolating.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAssetTemplate`] when the spec has no
    /// asset section.
    pub fn resolve(&self, os: Os, arch: Arch) -> Result<ResolvedAsset, ConfigError> {
        let asset = self
            .spec
            .asset
            .as_ref()
            .ok_or(ConfigError::MissingAssetTemplate)?;
        Ok(resolve_asset(asset, os, arch))
    }

    /// Generate the asset filename for one platform.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAssetTemplate`] when neither the asset
    /// config nor a matching rule provides a non-empty template.
    pub fn generate(&self, os: Os, arch: Arch) -> Result<String, ConfigError> {
        let resolved = self.resolve(os, arch)?;
        let template = resolved
            .template
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingAssetTemplate)?;
        let vars = asset_vars(&self.name, &self.tag, &resolved.os, &resolved.arch, &resolved.ext);
        Ok(interpolate(template, &vars))
    }

    /// Every distinct filename this spec can produce.
    ///
    /// Iterates the spec's supported platforms when listed, otherwise the
    /// full built-in OS×architecture matrix. Combinations that fail to
    /// generate are skipped; results are deduplicated and sorted. This set
    /// drives manifest filtering, calculate-mode matching, and the
    /// platform-detection path of validation tooling.
    pub fn possible_filenames(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for Platform { os, arch } in self.platforms() {
            if let Ok(filename) = self.generate(os, arch) {
                if !filename.is_empty() {
                    names.insert(filename);
                }
            }
        }
        names
    }

    /// The platform to fall back to when the requested one has no asset but
    /// an emulation layer can run a foreign binary (Rosetta 2 on Apple
    /// Silicon). `None` when no fallback applies.
    pub fn emulation_fallback(&self, os: Os, arch: Arch) -> Option<Platform> {
        let emulation = self.spec.asset.as_ref()?.arch_emulation?;
        if emulation.rosetta2 && os == Os::Darwin && arch == Arch::Arm64 {
            Some(Platform {
                os,
                arch: Arch::Amd64,
            })
        } else {
            None
        }
    }

    fn platforms(&self) -> Vec<Platform> {
        if let Some(listed) = self.spec.supported_platforms.as_ref() {
            listed.clone()
        } else {
            let mut all = Vec::with_capacity(ALL_OS.len() * ALL_ARCH.len());
            for &os in ALL_OS {
                for &arch in ALL_ARCH {
                    all.push(Platform { os, arch });
                }
            }
            all
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binspec_schema::spec::{ArchEmulation, AssetConfig};

    fn base_spec() -> InstallSpec {
        InstallSpec {
            name: Some("testapp".to_string()),
            repository: Some("example/testapp".to_string()),
            asset: Some(AssetConfig {
                template: Some("${NAME}_${VERSION}_${OS}_${ARCH}.tar.gz".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn generates_basic_filename() {
        let spec = base_spec();
        let generator = FilenameGenerator::new(&spec, "1.0.0").unwrap();
        assert_eq!(
            generator.generate(Os::Linux, Arch::Amd64).unwrap(),
            "testapp_1.0.0_linux_amd64.tar.gz"
        );
    }

    #[test]
    fn missing_template_is_a_config_error() {
        let mut spec = base_spec();
        spec.asset = None;
        let generator = FilenameGenerator::new(&spec, "1.0.0").unwrap();
        assert!(matches!(
            generator.generate(Os::Linux, Arch::Amd64),
            Err(ConfigError::MissingAssetTemplate)
        ));

        spec.asset = Some(AssetConfig::default());
        let generator = FilenameGenerator::new(&spec, "1.0.0").unwrap();
        assert!(matches!(
            generator.generate(Os::Linux, Arch::Amd64),
            Err(ConfigError::MissingAssetTemplate)
        ));

        // An empty template is as unusable as an absent one.
        spec.asset = Some(AssetConfig {
            template: Some(String::new()),
            ..Default::default()
        });
        let generator = FilenameGenerator::new(&spec, "1.0.0").unwrap();
        assert!(matches!(
            generator.generate(Os::Linux, Arch::Amd64),
            Err(ConfigError::MissingAssetTemplate)
        ));
    }

    #[test]
    fn enumerates_supported_platforms_exactly() {
        let mut spec = base_spec();
        spec.supported_platforms = Some(vec![
            Platform {
                os: Os::Linux,
                arch: Arch::Amd64,
            },
            Platform {
                os: Os::Darwin,
                arch: Arch::Arm64,
            },
        ]);
        let generator = FilenameGenerator::new(&spec, "1.0.0").unwrap();
        let names = generator.possible_filenames();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec![
                "testapp_1.0.0_darwin_arm64.tar.gz".to_string(),
                "testapp_1.0.0_linux_amd64.tar.gz".to_string(),
            ]
        );
    }

    #[test]
    fn full_matrix_deduplicates() {
        // A template without ${OS}/${ARCH} collapses the whole matrix into
        // one filename.
        let mut spec = base_spec();
        spec.asset.as_mut().unwrap().template = Some("${NAME}-${VERSION}.tar.gz".to_string());
        let generator = FilenameGenerator::new(&spec, "v2.0.0").unwrap();
        let names = generator.possible_filenames();
        assert_eq!(names.len(), 1);
        assert!(names.contains("testapp-2.0.0.tar.gz"));
    }

    #[test]
    fn rosetta2_fallback_only_for_darwin_arm64() {
        let mut spec = base_spec();
        spec.asset.as_mut().unwrap().arch_emulation = Some(ArchEmulation { rosetta2: true });
        let generator = FilenameGenerator::new(&spec, "1.0.0").unwrap();

        let fallback = generator.emulation_fallback(Os::Darwin, Arch::Arm64).unwrap();
        assert_eq!(fallback.arch, Arch::Amd64);
        assert!(generator.emulation_fallback(Os::Linux, Arch::Arm64).is_none());
        assert!(generator.emulation_fallback(Os::Darwin, Arch::Amd64).is_none());

        spec.asset.as_mut().unwrap().arch_emulation = None;
        let generator = FilenameGenerator::new(&spec, "1.0.0").unwrap();
        assert!(generator.emulation_fallback(Os::Darwin, Arch::Arm64).is_none());
    }
}
