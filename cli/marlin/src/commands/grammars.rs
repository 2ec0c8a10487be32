//! `marlin transform-grammars` — run grammar files through the generator.

use std::path::Path;

use anyhow::{bail, Context, Result};
use marlin_pipeline::{transform_grammars, GrammarFile};
use marlin_toolchain::Toolchain;

use crate::manifest::MarlinManifest;

/// Regenerate the source/header pair for every stale grammar file.
pub fn run(project_dir: &Path, manifest: &MarlinManifest) -> Result<()> {
    let tc = Toolchain::resolve()?;
    let layout = manifest.project_layout(project_dir, &tc);

    if !layout.generator_exe.exists() {
        bail!(
            "generator not built at {} (run `marlin build-generator` first)",
            layout.generator_exe.display()
        );
    }

    let grammars = GrammarFile::discover(&layout.source_dir)
        .with_context(|| format!("scanning {}", layout.source_dir.display()))?;
    let regenerated = transform_grammars(&grammars, &layout.generator_exe)?;
    println!(
        "{regenerated} of {} grammar files regenerated.",
        grammars.len()
    );
    Ok(())
}
