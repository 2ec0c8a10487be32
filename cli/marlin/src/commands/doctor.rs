//! `marlin doctor` — toolchain diagnostics.

use std::path::Path;
use std::process::Command;

use anyhow::Result;
use marlin_toolchain::Toolchain;

use crate::manifest::MarlinManifest;

/// Print toolchain diagnostic information.
pub fn run(project_dir: &Path, json: bool) -> Result<()> {
    if json {
        let tc = Toolchain::resolve()?;
        println!("{}", serde_json::to_string_pretty(&tc)?);
        return Ok(());
    }

    println!("=== Marlin Doctor ===");
    println!();

    println!("Marlin version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("--- Toolchain ---");
    match Toolchain::resolve() {
        Ok(tc) => {
            println!("  compiler: {} ({})", tc.cc, tc.kind);
            if tc.base_cflags.is_empty() {
                println!("  cflags:   (none)");
            } else {
                println!("  cflags:   {}", tc.base_cflags);
            }
        }
        Err(e) => println!("  compiler: not found — {e}"),
    }
    println!();

    println!("--- System Tools ---");
    print_tool_status("make", &["--version"]);
    print_tool_status("valgrind", &["--version"]);
    println!();

    println!("--- Project Status ---");
    match MarlinManifest::find_and_load(project_dir) {
        Ok(Some((manifest, dir))) => {
            println!("  marlin.toml: found at {}", dir.display());
            println!("  Extension:   {}", manifest.project.name);
            println!("  Version:     {}", manifest.project.version);
        }
        Ok(None) => {
            println!("  marlin.toml: not found (defaults apply)");
        }
        Err(e) => {
            println!("  marlin.toml: error — {e}");
        }
    }

    Ok(())
}

fn print_tool_status(name: &str, args: &[&str]) {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout);
            let first_line = version.lines().next().unwrap_or("(unknown version)");
            println!("  {name}: {first_line}");
        }
        Err(_) => {
            println!("  {name}: not found");
        }
    }
}
