//! Delegated nested builds.
//!
//! The parser generator lives in its own pre-existing build tree and is
//! driven through make with a platform-appropriate build-file variant rather
//! than reimplemented here. The nested tree expects to be built from its own
//! directory, so the process working directory is switched for the duration
//! of the call and restored on every exit path.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use marlin_toolchain::{CompilerKind, HostPlatform, Toolchain};

use crate::error::{PipelineError, Result};
use crate::exec;

const MAKE: &str = "make";

/// Make invocation for this toolchain, `args` appended.
///
/// MSVC gets its dedicated build file; a non-MSVC compiler on Windows gets
/// the MinGW variant; everywhere else the tree's default build file applies.
pub fn make_command(tc: &Toolchain, args: &[String]) -> Vec<String> {
    let mut tokens = vec![MAKE.to_string()];
    if tc.kind == CompilerKind::Msvc {
        tokens.push("-f".to_string());
        tokens.push("Makefile.MSVC".to_string());
    } else if tc.platform == HostPlatform::Windows {
        tokens.push("-f".to_string());
        tokens.push("Makefile.MinGW".to_string());
    }
    tokens.extend(args.iter().cloned());
    tokens
}

/// Scoped change of the process working directory. The previous directory
/// is restored when the guard drops, including on error paths.
pub struct CwdGuard {
    previous: PathBuf,
}

impl CwdGuard {
    /// Change the process working directory to `dir`.
    pub fn change_to(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        Ok(CwdGuard { previous })
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.previous);
    }
}

/// Run make in `dir` with the platform-appropriate build-file variant.
///
/// The underlying exit status propagates in [`PipelineError::NestedBuild`].
pub fn run_make(tc: &Toolchain, args: &[String], dir: &Path) -> Result<()> {
    run_tokens_in(make_command(tc, args), dir)
}

fn run_tokens_in(tokens: Vec<String>, dir: &Path) -> Result<()> {
    let command = exec::render(&tokens);
    println!("{command}");
    let _guard = CwdGuard::change_to(dir)?;
    let status = exec::run(&tokens, None)?;
    if status != 0 {
        return Err(PipelineError::NestedBuild { command, status });
    }
    Ok(())
}

/// Serializes tests (and anything else in this crate's test binary) that
/// mutate the process-wide working directory.
#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
