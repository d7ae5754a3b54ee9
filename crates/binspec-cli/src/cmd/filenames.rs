//! `binspec filenames` - enumerate every filename a spec can produce.

use std::path::Path;

use anyhow::Result;
use binspec_core::FilenameGenerator;
use binspec_schema::{Arch, Os};

pub async fn filenames(spec_path: &Path, version: Option<&str>, current: bool) -> Result<()> {
    let (spec, _) = super::load_spec(spec_path).await?;
    let version = super::resolve_version(version, &spec, None)?;

    let generator = FilenameGenerator::new(&spec, &version)?;
    if current {
        println!("{}", generator.generate(Os::current(), Arch::current())?);
        return Ok(());
    }
    for filename in generator.possible_filenames() {
        println!("{filename}");
    }
    Ok(())
}
