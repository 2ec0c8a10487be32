//! `marlin clean` — remove generated build artifacts.

use std::path::Path;

use anyhow::Result;
use marlin_pipeline::clean_artifacts;
use marlin_toolchain::Toolchain;

use crate::manifest::MarlinManifest;

/// Remove every generated artifact, tolerating partial failure. Failures are
/// reported as warnings; the command itself still succeeds so repeated
/// cleans stay idempotent.
pub fn run(project_dir: &Path, manifest: &MarlinManifest) -> Result<()> {
    let tc = Toolchain::resolve()?;
    let layout = manifest.project_layout(project_dir, &tc);

    let summary = clean_artifacts(&layout, &tc);
    for path in &summary.removed {
        println!("Removed {}", path.display());
    }
    for failure in &summary.failures {
        eprintln!("warning: {failure}");
    }
    if summary.removed.is_empty() && summary.failures.is_empty() {
        println!("Already clean.");
    }
    Ok(())
}
