//! Cleanup of generated artifacts.
//!
//! Unlike the forward pipeline, cleanup tolerates partial failure: every
//! removal is attempted, missing files are not errors, and problems are
//! accumulated for reporting instead of aborting the remaining work.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use marlin_toolchain::Toolchain;

use crate::grammar::GrammarFile;
use crate::layout::{ProjectLayout, PROBE_SCRATCH_PREFIX};
use crate::nested::run_make;

/// What a cleanup pass removed and what went wrong along the way.
#[derive(Debug, Default)]
pub struct CleanSummary {
    /// Paths actually deleted.
    pub removed: Vec<PathBuf>,
    /// Failures encountered; cleanup continued past each one.
    pub failures: Vec<String>,
}

/// Delete all generated artifacts: probe executable, configuration header,
/// probe scratch files, generated grammar pairs, and the output directory.
/// Delegates a `clean` to the generator's nested build tree first.
pub fn clean_artifacts(layout: &ProjectLayout, tc: &Toolchain) -> CleanSummary {
    let mut summary = CleanSummary::default();

    // The generator's tree cleans itself. A failure there is collected and
    // reported, not allowed to block the local removals below.
    if layout.generator_dir.is_dir() {
        if let Err(e) = run_make(tc, &["clean".to_string()], &layout.generator_dir) {
            summary.failures.push(format!("generator clean: {e}"));
        }
    }

    remove(&layout.probe_exe, &mut summary);
    remove(&layout.config_header, &mut summary);
    remove_scratch(layout, &mut summary);

    if layout.source_dir.is_dir() {
        match GrammarFile::discover(&layout.source_dir) {
            Ok(grammars) => {
                for grammar in grammars {
                    remove(&grammar.generated_source, &mut summary);
                    remove(&grammar.generated_header, &mut summary);
                }
            }
            Err(e) => summary.failures.push(format!(
                "scanning {}: {e}",
                layout.source_dir.display()
            )),
        }
    }

    remove(&layout.out_dir, &mut summary);
    summary
}

/// Remove one file or directory; absence is fine.
fn remove(path: &Path, summary: &mut CleanSummary) {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => {
            summary.failures.push(format!("{}: {e}", path.display()));
            return;
        }
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => summary.removed.push(path.to_path_buf()),
        Err(e) => summary.failures.push(format!("{}: {e}", path.display())),
    }
}

/// The probe leaves `_hostprobe*` scratch files next to the configuration
/// header; sweep them by prefix. Evaluated at clean time, never cached.
fn remove_scratch(layout: &ProjectLayout, summary: &mut CleanSummary) {
    let scratch_dir = layout
        .config_header
        .parent()
        .unwrap_or(&layout.project_dir);
    let entries = match fs::read_dir(scratch_dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        if name
            .to_str()
            .is_some_and(|n| n.starts_with(PROBE_SCRATCH_PREFIX))
        {
            remove(&entry.path(), summary);
        }
    }
}
