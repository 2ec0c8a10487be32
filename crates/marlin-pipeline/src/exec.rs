//! Subprocess invocation shared by the pipeline stages.

use std::path::Path;
use std::process::Command;

use crate::error::{PipelineError, Result};

/// Render a token sequence as the command line printed before running it.
pub(crate) fn render(tokens: &[String]) -> String {
    tokens.join(" ")
}

/// Run `tokens` as a subprocess and return its exit status.
///
/// `cwd`, when given, applies only to the child process. A subprocess killed
/// by a signal has no numeric status and is reported as -1.
pub(crate) fn run(tokens: &[String], cwd: Option<&Path>) -> Result<i32> {
    let (program, args) = tokens.split_first().ok_or_else(|| PipelineError::Spawn {
        program: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
    })?;

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let status = command.status().map_err(|source| PipelineError::Spawn {
        program: program.clone(),
        source,
    })?;
    Ok(status.code().unwrap_or(-1))
}
