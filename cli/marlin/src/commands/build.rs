//! `marlin build` — run the full staged pipeline.

use std::path::Path;

use anyhow::Result;
use marlin_pipeline::{run_build, PipelineConfig};
use marlin_toolchain::Toolchain;

use crate::manifest::MarlinManifest;

/// Resolve the toolchain and run every pipeline stage in order.
pub fn run(project_dir: &Path, manifest: &MarlinManifest) -> Result<()> {
    let tc = Toolchain::resolve()?;
    println!("Toolchain: {} ({})", tc.cc, tc.kind);

    let config = PipelineConfig {
        layout: manifest.project_layout(project_dir, &tc),
        defines: manifest.defines(),
        include_dirs: manifest.include_dirs(project_dir),
        toolchain: tc,
    };
    let report = run_build(&config)?;

    if report.nothing_to_do() {
        println!("Everything up to date.");
    } else {
        if report.probe_ran {
            println!(
                "Configuration header refreshed: {}",
                config.layout.config_header.display()
            );
        }
        if report.generator_built {
            println!("Generator built: {}", config.layout.generator_exe.display());
        }
        if report.grammars_regenerated > 0 {
            println!("Grammars regenerated: {}", report.grammars_regenerated);
        }
        if report.linked {
            println!(
                "Linked {} sources in {} ms.",
                report.sources, report.duration_ms
            );
        }
    }
    println!("Artifact: {}", report.artifact.display());
    Ok(())
}
