//! `marlin build-probe` — compile and run the feature-detection probe.

use std::path::Path;

use anyhow::Result;
use marlin_pipeline::{build_tool, run_probe};
use marlin_toolchain::Toolchain;

use crate::manifest::MarlinManifest;

/// Compile the probe from source if stale, then run it to regenerate the
/// configuration header if that is stale too.
pub fn run(project_dir: &Path, manifest: &MarlinManifest) -> Result<()> {
    let tc = Toolchain::resolve()?;
    let layout = manifest.project_layout(project_dir, &tc);

    let compiled = build_tool(&tc, &layout.probe_source, &layout.probe_exe, &[])?;
    let ran = run_probe(&tc, &layout.probe_exe, &layout.config_header)?;

    if !compiled && !ran {
        println!("Probe and configuration header up to date.");
    } else {
        println!(
            "Configuration header: {}",
            layout.config_header.display()
        );
    }
    Ok(())
}
