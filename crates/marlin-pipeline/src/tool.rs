//! Helper-tool compilation.
//!
//! Compiles a single-file native helper (the feature-detection probe) by
//! invoking the host compiler directly, not through the nested build tree.

use std::path::Path;

use marlin_toolchain::{CompilerKind, Toolchain};

use crate::error::{PipelineError, Result};
use crate::exec;
use crate::fresh::is_fresh;

/// Command line for compiling `source` into the executable `output`.
///
/// MSVC names its output with `/Fe`; everything else takes `-o`.
pub fn tool_command(
    tc: &Toolchain,
    source: &Path,
    output: &Path,
    extra_flags: &[String],
) -> Vec<String> {
    let mut tokens = tc.cc_tokens();
    tokens.extend(extra_flags.iter().cloned());
    match tc.kind {
        CompilerKind::Msvc => tokens.push(format!("/Fe{}", output.display())),
        CompilerKind::Generic => {
            tokens.push("-o".to_string());
            tokens.push(output.display().to_string());
        }
    }
    tokens.push(source.display().to_string());
    tokens
}

/// Compile `source` into `output` unless the output is already fresh.
///
/// Returns whether a compile actually ran. The source must exist; the
/// compiler's exit status is surfaced in [`PipelineError::ToolCompile`]
/// together with the exact command line.
pub fn build_tool(
    tc: &Toolchain,
    source: &Path,
    output: &Path,
    extra_flags: &[String],
) -> Result<bool> {
    if !source.exists() {
        return Err(PipelineError::MissingInput {
            path: source.to_path_buf(),
        });
    }
    if is_fresh(output, &[source])? {
        return Ok(false);
    }

    let tokens = tool_command(tc, source, output, extra_flags);
    let command = exec::render(&tokens);
    println!("{command}");
    let status = exec::run(&tokens, None)?;
    if status != 0 {
        return Err(PipelineError::ToolCompile { command, status });
    }
    Ok(true)
}
