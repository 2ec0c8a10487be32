//! Probe execution.
//!
//! Runs the compiled feature-detection probe, which writes the configuration
//! header into its working directory as a side effect of a successful exit.
//! The probe receives the quoted compiler identity and the baseline flags so
//! its detection runs against the same toolchain the extension will be built
//! with.

use std::env;
use std::path::Path;

use marlin_toolchain::Toolchain;

use crate::error::{PipelineError, Result};
use crate::exec;
use crate::fresh::is_fresh;

/// Environment variable that wraps the probe in a memory-checking harness
/// for diagnostic builds.
pub const VALGRIND_ENV: &str = "MARLIN_VALGRIND";

/// Argument list handed to the probe executable.
pub fn probe_arguments(tc: &Toolchain) -> Vec<String> {
    let mut args = vec![format!("--cc={}", tc.quoted_cc())];
    if !tc.base_cflags.is_empty() {
        args.push("--".to_string());
        args.push(tc.base_cflags.clone());
    }
    args
}

/// Prepend the memory-checking harness. The probe's own arguments are left
/// untouched.
fn wrap_for_diagnostics(tokens: Vec<String>) -> Vec<String> {
    let mut wrapped = vec!["valgrind".to_string(), "--leak-check=yes".to_string()];
    wrapped.extend(tokens);
    wrapped
}

/// Run the probe unless `header` is already fresh relative to the probe
/// executable. Returns whether the probe actually ran.
///
/// The probe's working directory is the header's parent, so the header and
/// any probe scratch files land next to it. A non-zero exit is fatal to the
/// pipeline: there is no fallback configuration.
pub fn run_probe(tc: &Toolchain, probe_exe: &Path, header: &Path) -> Result<bool> {
    if !probe_exe.exists() {
        return Err(PipelineError::MissingInput {
            path: probe_exe.to_path_buf(),
        });
    }
    if is_fresh(header, &[probe_exe])? {
        return Ok(false);
    }

    // The child runs from the header's directory; resolve the executable
    // before the path loses its meaning.
    let exe = probe_exe.canonicalize()?;
    let mut tokens = vec![exe.display().to_string()];
    tokens.extend(probe_arguments(tc));
    if env::var_os(VALGRIND_ENV).is_some() {
        tokens = wrap_for_diagnostics(tokens);
    }

    let command = exec::render(&tokens);
    println!("{command}");
    let cwd = header.parent().filter(|p| !p.as_os_str().is_empty());
    let status = exec::run(&tokens, cwd)?;
    if status != 0 {
        return Err(PipelineError::ProbeExecution { command, status });
    }
    Ok(true)
}
