//! Staged build pipeline for a native extension that embeds its own
//! code-generation toolchain.
//!
//! The pipeline compiles a feature-detection probe from source, runs it to
//! produce a configuration header, builds a parser generator through its own
//! nested build tree, feeds grammar files through the generator, aggregates
//! every compilable source, and links the loadable extension. Each staged
//! action is guarded by a timestamp freshness check, so an unchanged tree
//! rebuilds nothing. Stages communicate only through files at known paths.

pub mod clean;
pub mod error;
pub mod fresh;
pub mod grammar;
pub mod layout;
pub mod link;
pub mod nested;
pub mod pipeline;
pub mod probe;
pub mod sources;
pub mod tool;

mod exec;

pub use clean::{clean_artifacts, CleanSummary};
pub use error::{PipelineError, Result};
pub use fresh::is_fresh;
pub use grammar::{transform_grammars, GrammarFile};
pub use layout::ProjectLayout;
pub use link::link_extension;
pub use nested::{make_command, run_make, CwdGuard};
pub use pipeline::{build_generator, run_build, BuildReport, PipelineConfig};
pub use probe::{probe_arguments, run_probe};
pub use sources::collect_sources;
pub use tool::{build_tool, tool_command};
