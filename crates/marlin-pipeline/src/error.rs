//! Pipeline errors.
//!
//! Every forward-pipeline stage fails fast; each variant carries enough of
//! the failing command to reproduce it by hand, and the subprocess exit
//! status so the CLI can propagate it unmodified.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during the staged build pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input file does not exist.
    #[error("missing input: {}", path.display())]
    MissingInput {
        /// The path that was expected to exist.
        path: PathBuf,
    },

    /// The helper-tool compiler subprocess exited non-zero.
    #[error("tool compile failed with status {status}: {command}")]
    ToolCompile { command: String, status: i32 },

    /// The probe executable exited non-zero. Fatal: there is no fallback
    /// configuration header.
    #[error("probe execution failed with status {status}: {command}")]
    ProbeExecution { command: String, status: i32 },

    /// A delegated nested build (make) exited non-zero.
    #[error("nested build failed with status {status}: {command}")]
    NestedBuild { command: String, status: i32 },

    /// The parser generator exited non-zero for one grammar file.
    #[error("grammar transform failed for {} with status {status}", file.display())]
    GrammarTransform { file: PathBuf, status: i32 },

    /// Object compilation or the final shared-library link failed.
    #[error("extension link failed with status {status}: {message}")]
    Link { message: String, status: i32 },

    /// A subprocess could not be launched at all.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error while checking freshness or preparing outputs.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// The exit status of the failing subprocess, when one exists.
    ///
    /// The CLI surfaces this unmodified so callers can distinguish compiler
    /// failures from generator failures from link failures.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            PipelineError::ToolCompile { status, .. }
            | PipelineError::ProbeExecution { status, .. }
            | PipelineError::NestedBuild { status, .. }
            | PipelineError::GrammarTransform { status, .. }
            | PipelineError::Link { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
