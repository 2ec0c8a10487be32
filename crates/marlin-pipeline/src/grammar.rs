//! Grammar transformation.
//!
//! Each `.y` grammar file is fed through the generator tool, which writes a
//! sibling `.c`/`.h` pair. Generation is independent per file: no grammar's
//! output depends on another's, so ordering is free to be the sorted
//! discovery order.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::exec;
use crate::fresh::is_fresh;
use crate::sources::collect_sources;

/// A grammar file and the generated pair it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarFile {
    /// The `.y` source.
    pub source: PathBuf,
    /// Generated C source, written next to the grammar.
    pub generated_source: PathBuf,
    /// Generated header, written next to the grammar.
    pub generated_header: PathBuf,
}

impl GrammarFile {
    /// Derive the generated pair for a grammar source path.
    pub fn from_source(source: PathBuf) -> Self {
        let generated_source = source.with_extension("c");
        let generated_header = source.with_extension("h");
        GrammarFile {
            source,
            generated_source,
            generated_header,
        }
    }

    /// Find every grammar file under `root`, in deterministic order.
    pub fn discover(root: &Path) -> io::Result<Vec<Self>> {
        Ok(collect_sources(root, &["y"])?
            .into_iter()
            .map(Self::from_source)
            .collect())
    }
}

/// Run each stale grammar through the generator; returns how many files were
/// regenerated.
///
/// Fail-fast: the first generator failure aborts the remaining files so a
/// tool-level defect is not masked by partial output.
pub fn transform_grammars(files: &[GrammarFile], generator_exe: &Path) -> Result<usize> {
    let mut regenerated = 0;
    for grammar in files {
        if is_fresh(&grammar.generated_source, &[&grammar.source])? {
            continue;
        }
        let tokens = vec![
            generator_exe.display().to_string(),
            grammar.source.display().to_string(),
        ];
        println!("{}", exec::render(&tokens));
        let status = exec::run(&tokens, None)?;
        if status != 0 {
            return Err(PipelineError::GrammarTransform {
                file: grammar.source.clone(),
                status,
            });
        }
        regenerated += 1;
    }
    Ok(regenerated)
}
