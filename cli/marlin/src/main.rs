//! Marlin CLI — staged build driver for native extensions that embed a
//! code-generation toolchain.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use marlin_pipeline::PipelineError;

use manifest::MarlinManifest;

#[derive(Parser)]
#[command(
    name = "marlin",
    version,
    about = "Staged build driver for native extensions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: probe, generator, grammars, link
    Build,
    /// Remove generated build artifacts
    Clean,
    /// Compile and run the feature-detection probe
    BuildProbe,
    /// Build the parser generator via its nested build tree
    BuildGenerator,
    /// Run grammar files through the generator
    TransformGrammars,
    /// Check toolchain and project status
    Doctor {
        /// Emit the resolved toolchain descriptor as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        // A failing subprocess's own exit status passes through unchanged so
        // callers can tell compiler failures from generator failures from
        // link failures.
        let code = e
            .downcast_ref::<PipelineError>()
            .and_then(PipelineError::exit_status)
            .unwrap_or(1);
        process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Build => {
            let (manifest, project_dir) = load_project(&cwd)?;
            commands::build::run(&project_dir, &manifest)
        }
        Commands::Clean => {
            let (manifest, project_dir) = load_project(&cwd)?;
            commands::clean::run(&project_dir, &manifest)
        }
        Commands::BuildProbe => {
            let (manifest, project_dir) = load_project(&cwd)?;
            commands::probe::run(&project_dir, &manifest)
        }
        Commands::BuildGenerator => {
            let (manifest, project_dir) = load_project(&cwd)?;
            commands::generator::run(&project_dir, &manifest)
        }
        Commands::TransformGrammars => {
            let (manifest, project_dir) = load_project(&cwd)?;
            commands::grammars::run(&project_dir, &manifest)
        }
        Commands::Doctor { json } => commands::doctor::run(&cwd, json),
    }
}

/// Load the manifest by upward search; without one, defaults apply in the
/// current directory.
fn load_project(cwd: &Path) -> anyhow::Result<(MarlinManifest, PathBuf)> {
    match MarlinManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((manifest, dir)),
        None => Ok((MarlinManifest::default_for(cwd), cwd.to_path_buf())),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use marlin_toolchain::Toolchain;
    use std::fs;

    #[test]
    fn exit_status_survives_anyhow_wrapping() {
        use anyhow::Context;

        let err: anyhow::Error = PipelineError::GrammarTransform {
            file: "rules.y".into(),
            status: 2,
        }
        .into();
        let err = err.context("transforming grammars");
        let code = err
            .downcast_ref::<PipelineError>()
            .and_then(PipelineError::exit_status);
        assert_eq!(code, Some(2));
    }

    #[test]
    fn load_project_defaults_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let (manifest, project_dir) = load_project(dir.path()).unwrap();
        assert_eq!(project_dir, dir.path());
        assert!(!manifest.project.name.is_empty());
    }

    #[test]
    fn load_project_finds_manifest_upward() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("marlin.toml"),
            "[project]\nname = \"reef\"\n",
        )
        .unwrap();
        let nested = dir.path().join("src").join("parser");
        fs::create_dir_all(&nested).unwrap();

        let (manifest, project_dir) = load_project(&nested).unwrap();
        assert_eq!(manifest.project.name, "reef");
        assert_eq!(project_dir, dir.path());
    }

    /// Clean removes generated artifacts, spares sources, and stays
    /// idempotent at the CLI level.
    #[test]
    fn clean_workflow() {
        let tc = match Toolchain::resolve() {
            Ok(tc) => tc,
            Err(_) => {
                eprintln!("skipping: no C compiler on this host");
                return;
            }
        };
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("marlin.toml"),
            "[project]\nname = \"reef\"\n",
        )
        .unwrap();
        let (manifest, project_dir) = load_project(dir.path()).unwrap();
        let layout = manifest.project_layout(&project_dir, &tc);

        fs::create_dir_all(&layout.source_dir).unwrap();
        fs::create_dir_all(&layout.out_dir).unwrap();
        fs::write(&layout.config_header, "#define X 1\n").unwrap();
        fs::write(layout.source_dir.join("rules.y"), "grammar").unwrap();
        fs::write(layout.source_dir.join("rules.c"), "generated").unwrap();
        fs::write(layout.out_dir.join("libreef.so"), "artifact").unwrap();

        commands::clean::run(&project_dir, &manifest).unwrap();
        assert!(!layout.config_header.exists());
        assert!(!layout.source_dir.join("rules.c").exists());
        assert!(!layout.out_dir.exists());
        assert!(layout.source_dir.join("rules.y").exists());

        // Second clean finds nothing and still succeeds.
        commands::clean::run(&project_dir, &manifest).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn transform_grammars_workflow() {
        use std::os::unix::fs::PermissionsExt;

        let tc = match Toolchain::resolve() {
            Ok(tc) => tc,
            Err(_) => {
                eprintln!("skipping: no C compiler on this host");
                return;
            }
        };
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("marlin.toml"),
            "[project]\nname = \"reef\"\n",
        )
        .unwrap();
        let (manifest, project_dir) = load_project(dir.path()).unwrap();
        let layout = manifest.project_layout(&project_dir, &tc);

        fs::create_dir_all(&layout.source_dir).unwrap();
        fs::write(layout.source_dir.join("rules.y"), "expr : term ;").unwrap();

        // Grammars before the generator exists: a helpful error.
        let err = commands::grammars::run(&project_dir, &manifest).unwrap_err();
        assert!(err.to_string().contains("build-generator"));

        // Install a fake generator and transform for real.
        fs::create_dir_all(&layout.generator_dir).unwrap();
        let script = "#!/bin/sh\n\
            base=\"${1%.y}\"\n\
            echo 'generated' > \"$base.c\"\n\
            echo 'generated' > \"$base.h\"\n";
        fs::write(&layout.generator_exe, script).unwrap();
        fs::set_permissions(
            &layout.generator_exe,
            fs::Permissions::from_mode(0o755),
        )
        .unwrap();

        commands::grammars::run(&project_dir, &manifest).unwrap();
        assert!(layout.source_dir.join("rules.c").exists());
        assert!(layout.source_dir.join("rules.h").exists());
    }
}
