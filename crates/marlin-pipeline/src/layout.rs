//! Project artifact layout.
//!
//! Resolves every path the pipeline reads or writes from the project
//! directory and the toolchain descriptor. Fields are plain data so callers
//! (the CLI manifest in particular) can override individual locations before
//! handing the layout to the pipeline.

use std::path::{Path, PathBuf};

use marlin_toolchain::Toolchain;

/// File-name prefix of the scratch files the probe drops next to the
/// configuration header while detecting features.
pub const PROBE_SCRATCH_PREFIX: &str = "_hostprobe";

/// All paths a pipeline run touches.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root (where the configuration header lands).
    pub project_dir: PathBuf,
    /// Extension C sources and grammar files.
    pub source_dir: PathBuf,
    /// Single-file source of the feature-detection probe.
    pub probe_source: PathBuf,
    /// Compiled probe executable.
    pub probe_exe: PathBuf,
    /// Configuration header written by the probe.
    pub config_header: PathBuf,
    /// Nested build tree of the parser generator.
    pub generator_dir: PathBuf,
    /// Generator executable produced by the nested build.
    pub generator_exe: PathBuf,
    /// Output directory for objects and the final artifact.
    pub out_dir: PathBuf,
    /// The loadable extension artifact.
    pub artifact: PathBuf,
}

impl ProjectLayout {
    /// Default layout for `project_dir`, with executable and library names
    /// suffixed per the toolchain's platform.
    pub fn new(project_dir: &Path, extension_name: &str, tc: &Toolchain) -> Self {
        let out_dir = project_dir.join("out");
        ProjectLayout {
            project_dir: project_dir.to_path_buf(),
            source_dir: project_dir.join("src"),
            probe_source: project_dir.join("probe").join("probe.c"),
            probe_exe: project_dir.join(tc.executable_filename("hostprobe")),
            config_header: project_dir.join("hostconf.h"),
            generator_dir: project_dir.join("pgen"),
            generator_exe: project_dir.join("pgen").join(tc.executable_filename("pgen")),
            artifact: out_dir.join(tc.shared_library_filename(extension_name)),
            out_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlin_toolchain::{CompilerKind, HostPlatform};

    #[test]
    fn default_layout_unix() {
        let tc = Toolchain {
            cc: "cc".to_string(),
            kind: CompilerKind::Generic,
            platform: HostPlatform::Unix,
            base_cflags: String::new(),
        };
        let layout = ProjectLayout::new(Path::new("/proj"), "reef", &tc);
        assert_eq!(layout.probe_exe, Path::new("/proj/hostprobe"));
        assert_eq!(layout.config_header, Path::new("/proj/hostconf.h"));
        assert_eq!(layout.generator_exe, Path::new("/proj/pgen/pgen"));
        assert_eq!(layout.artifact, Path::new("/proj/out/libreef.so"));
    }

    #[test]
    fn default_layout_windows_suffixes() {
        let tc = Toolchain {
            cc: "cl".to_string(),
            kind: CompilerKind::Msvc,
            platform: HostPlatform::Windows,
            base_cflags: String::new(),
        };
        let layout = ProjectLayout::new(Path::new("proj"), "reef", &tc);
        assert!(layout.probe_exe.ends_with("hostprobe.exe"));
        assert!(layout.generator_exe.ends_with("pgen.exe"));
        assert!(layout.artifact.ends_with("reef.dll"));
    }
}
