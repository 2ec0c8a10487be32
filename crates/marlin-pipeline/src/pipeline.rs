//! Pipeline orchestration.
//!
//! Runs the stages in their required order: probe tool → probe → generator
//! (nested build) → grammar transform → source aggregation → link. Each
//! stage's freshness guard makes the pipeline cheap to re-run; the report
//! records which stages actually did work.

use std::path::{Path, PathBuf};
use std::time::Instant;

use marlin_toolchain::Toolchain;

use crate::error::Result;
use crate::fresh::is_fresh;
use crate::grammar::{transform_grammars, GrammarFile};
use crate::layout::ProjectLayout;
use crate::link::link_extension;
use crate::nested::run_make;
use crate::probe::run_probe;
use crate::sources::collect_sources;
use crate::tool::build_tool;

/// Everything a pipeline run needs, assembled once by the caller.
pub struct PipelineConfig {
    /// The resolved host toolchain, shared by every stage.
    pub toolchain: Toolchain,
    /// Artifact paths.
    pub layout: ProjectLayout,
    /// Preprocessor defines identifying the embedding mode.
    pub defines: Vec<String>,
    /// Include search paths beyond the project and source directories.
    pub include_dirs: Vec<PathBuf>,
}

/// What one pipeline run actually did.
#[derive(Debug)]
pub struct BuildReport {
    /// The probe tool was (re)compiled.
    pub probe_compiled: bool,
    /// The probe ran and rewrote the configuration header.
    pub probe_ran: bool,
    /// The generator was built through its nested tree.
    pub generator_built: bool,
    /// How many grammar files were regenerated.
    pub grammars_regenerated: usize,
    /// The extension was relinked.
    pub linked: bool,
    /// Size of the aggregated source set.
    pub sources: usize,
    /// The extension artifact.
    pub artifact: PathBuf,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

impl BuildReport {
    /// True when every stage found its outputs fresh and ran nothing.
    pub fn nothing_to_do(&self) -> bool {
        !self.probe_compiled
            && !self.probe_ran
            && !self.generator_built
            && self.grammars_regenerated == 0
            && !self.linked
    }
}

/// Build the generator through its nested tree unless its executable already
/// exists; staleness inside the tree is the nested build's own business.
pub fn build_generator(tc: &Toolchain, layout: &ProjectLayout) -> Result<bool> {
    if layout.generator_exe.exists() {
        return Ok(false);
    }
    run_make(
        tc,
        &[format!("CC={}", tc.quoted_cc())],
        &layout.generator_dir,
    )?;
    Ok(true)
}

/// Run the full build pipeline.
pub fn run_build(config: &PipelineConfig) -> Result<BuildReport> {
    let start = Instant::now();
    let tc = &config.toolchain;
    let layout = &config.layout;

    let probe_compiled = build_tool(tc, &layout.probe_source, &layout.probe_exe, &[])?;
    let probe_ran = run_probe(tc, &layout.probe_exe, &layout.config_header)?;

    let generator_built = build_generator(tc, layout)?;

    let grammars = GrammarFile::discover(&layout.source_dir)?;
    let grammars_regenerated = transform_grammars(&grammars, &layout.generator_exe)?;

    // Aggregation sees whatever is on disk now, generated sources included.
    let sources = collect_sources(&layout.source_dir, &["c"])?;

    // The link is gated on the artifact's own freshness so that a fully
    // fresh tree performs zero subprocess invocations.
    let mut link_inputs: Vec<&Path> = sources.iter().map(PathBuf::as_path).collect();
    link_inputs.push(&layout.config_header);
    let linked = if is_fresh(&layout.artifact, &link_inputs)? {
        false
    } else {
        let mut include_dirs = vec![layout.project_dir.clone(), layout.source_dir.clone()];
        include_dirs.extend(config.include_dirs.iter().cloned());
        link_extension(
            tc,
            &sources,
            &include_dirs,
            &config.defines,
            &layout.artifact,
        )?;
        true
    };

    Ok(BuildReport {
        probe_compiled,
        probe_ran,
        generator_built,
        grammars_regenerated,
        linked,
        sources: sources.len(),
        artifact: layout.artifact.clone(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_knows_when_nothing_ran() {
        let report = BuildReport {
            probe_compiled: false,
            probe_ran: false,
            generator_built: false,
            grammars_regenerated: 0,
            linked: false,
            sources: 3,
            artifact: PathBuf::from("out/libext.so"),
            duration_ms: 1,
        };
        assert!(report.nothing_to_do());
    }

    #[cfg(unix)]
    mod e2e {
        use super::*;
        use crate::nested::CWD_LOCK;
        use marlin_toolchain::CompilerKind;
        use std::fs;
        use std::path::Path;
        use std::process::Command;
        use std::time::{Duration, SystemTime};

        fn has_tool(name: &str) -> bool {
            Command::new(name).arg("--version").output().is_ok()
        }

        fn age(path: &Path, secs_ago: u64) {
            let then = SystemTime::now() - Duration::from_secs(secs_ago);
            let f = fs::OpenOptions::new().write(true).open(path).unwrap();
            f.set_modified(then).unwrap();
        }

        /// A miniature but real project: probe, nested generator tree, one
        /// grammar, one hand-written source.
        fn write_project(dir: &Path) {
            fs::create_dir_all(dir.join("probe")).unwrap();
            fs::create_dir_all(dir.join("pgen")).unwrap();
            fs::create_dir_all(dir.join("src")).unwrap();

            fs::write(
                dir.join("probe/probe.c"),
                "#include <stdio.h>\n\
                 int main(void) {\n\
                 \x20   FILE *f = fopen(\"hostconf.h\", \"w\");\n\
                 \x20   if (!f) return 1;\n\
                 \x20   fputs(\"#define HAS_PROBE 1\\n\", f);\n\
                 \x20   fclose(f);\n\
                 \x20   return 0;\n\
                 }\n",
            )
            .unwrap();

            fs::write(
                dir.join("pgen/Makefile"),
                "CC ?= cc\n\npgen: pgen.c\n\t$(CC) -o pgen pgen.c\n\nclean:\n\trm -f pgen\n",
            )
            .unwrap();
            fs::write(
                dir.join("pgen/pgen.c"),
                "#include <stdio.h>\n\
                 #include <string.h>\n\
                 int main(int argc, char **argv) {\n\
                 \x20   char path[4096];\n\
                 \x20   size_t n;\n\
                 \x20   FILE *f;\n\
                 \x20   if (argc < 2) return 1;\n\
                 \x20   n = strlen(argv[1]);\n\
                 \x20   if (n < 2 || n + 1 > sizeof(path)) return 1;\n\
                 \x20   strcpy(path, argv[1]);\n\
                 \x20   path[n - 1] = 'c';\n\
                 \x20   f = fopen(path, \"w\");\n\
                 \x20   if (!f) return 1;\n\
                 \x20   fputs(\"int parser_rule_count(void) { return 1; }\\n\", f);\n\
                 \x20   fclose(f);\n\
                 \x20   path[n - 1] = 'h';\n\
                 \x20   f = fopen(path, \"w\");\n\
                 \x20   if (!f) return 1;\n\
                 \x20   fputs(\"int parser_rule_count(void);\\n\", f);\n\
                 \x20   fclose(f);\n\
                 \x20   return 0;\n\
                 }\n",
            )
            .unwrap();

            fs::write(
                dir.join("src/ext.c"),
                "#include \"hostconf.h\"\nint ext_entry(void) { return HAS_PROBE; }\n",
            )
            .unwrap();
            fs::write(dir.join("src/rules.y"), "expr : expr PLUS term ;\n").unwrap();
        }

        #[test]
        fn full_build_is_idempotent_and_staleness_aware() {
            let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            if !has_tool("make") {
                eprintln!("skipping: make not available");
                return;
            }
            let tc = match Toolchain::resolve() {
                Ok(tc) if tc.kind == CompilerKind::Generic => tc,
                _ => {
                    eprintln!("skipping: no generic C compiler on this host");
                    return;
                }
            };

            let dir = tempfile::tempdir().unwrap();
            write_project(dir.path());
            let config = PipelineConfig {
                layout: ProjectLayout::new(dir.path(), "ext", &tc),
                toolchain: tc,
                defines: vec!["EXT_EMBEDDED".to_string()],
                include_dirs: vec![],
            };

            // First run: every stage does work.
            let report = run_build(&config).unwrap();
            assert!(report.probe_compiled);
            assert!(report.probe_ran);
            assert!(report.generator_built);
            assert_eq!(report.grammars_regenerated, 1);
            assert!(report.linked);
            assert_eq!(report.sources, 2); // ext.c + generated rules.c
            assert!(report.artifact.exists());
            assert!(config.layout.config_header.exists());

            // Second run over the unchanged tree: nothing at all.
            let report = run_build(&config).unwrap();
            assert!(report.nothing_to_do(), "{report:?}");

            // One stale grammar output: exactly one regeneration, then a
            // relink because the generated source is now newer.
            age(&dir.path().join("src/rules.c"), 60);
            age(&report.artifact, 120);
            let report = run_build(&config).unwrap();
            assert!(!report.probe_compiled);
            assert!(!report.probe_ran);
            assert!(!report.generator_built);
            assert_eq!(report.grammars_regenerated, 1);
            assert!(report.linked);
        }
    }
}
