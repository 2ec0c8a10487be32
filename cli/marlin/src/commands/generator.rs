//! `marlin build-generator` — build the parser generator via its nested tree.

use std::path::Path;

use anyhow::Result;
use marlin_pipeline::build_generator;
use marlin_toolchain::Toolchain;

use crate::manifest::MarlinManifest;

/// Drive the generator's own build tree unless its executable exists.
pub fn run(project_dir: &Path, manifest: &MarlinManifest) -> Result<()> {
    let tc = Toolchain::resolve()?;
    let layout = manifest.project_layout(project_dir, &tc);

    if build_generator(&tc, &layout)? {
        println!("Generator built: {}", layout.generator_exe.display());
    } else {
        println!("Generator up to date: {}", layout.generator_exe.display());
    }
    Ok(())
}
