//! The resolved compiler descriptor.
//!
//! `Toolchain::resolve` probes the host for a usable C compiler and captures
//! everything later build stages need to know about it. Nothing here has side
//! effects beyond spawning candidate compilers to see whether they exist.

use std::env;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolchainError};

/// Coarse classification of the compiler's command-line dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerKind {
    /// Unix-style drivers (`cc`, `gcc`, `clang`, MinGW).
    Generic,
    /// Microsoft `cl` and lookalikes (`/Fe` output naming, `/LD` linking).
    Msvc,
}

impl std::fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilerKind::Generic => write!(f, "generic"),
            CompilerKind::Msvc => write!(f, "msvc"),
        }
    }
}

/// Host platform family, as far as build-file selection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostPlatform {
    Unix,
    Windows,
    Other,
}

impl HostPlatform {
    /// The platform family this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else if cfg!(unix) {
            HostPlatform::Unix
        } else {
            HostPlatform::Other
        }
    }
}

/// The resolved identity, classification, and baseline flags of the host's
/// native compiler. Immutable once computed; shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    /// Compiler invocation string. May carry leading arguments when taken
    /// from `$CC` (e.g. `"gcc -m64"`).
    pub cc: String,
    /// Command-line dialect.
    pub kind: CompilerKind,
    /// Host platform family.
    pub platform: HostPlatform,
    /// Baseline compile flags from the host build configuration (`$CFLAGS`).
    pub base_cflags: String,
}

impl Toolchain {
    /// Resolve the default native compiler for this host.
    ///
    /// `$CC` takes precedence; otherwise platform-default candidates are
    /// probed in order. A candidate is usable when it can be spawned at all —
    /// its exit status is ignored, since `cl` exits non-zero without
    /// arguments.
    pub fn resolve() -> Result<Self> {
        let platform = HostPlatform::current();
        let cc_override = env::var("CC").ok().filter(|s| !s.trim().is_empty());
        let candidates = candidate_compilers(platform, cc_override);

        for candidate in &candidates {
            if responds(candidate) {
                return Ok(Toolchain {
                    cc: candidate.clone(),
                    kind: classify(candidate),
                    platform,
                    base_cflags: env::var("CFLAGS").unwrap_or_default(),
                });
            }
        }

        Err(ToolchainError::NoUsableCompiler {
            searched: candidates,
        })
    }

    /// The compiler invocation split into argv tokens.
    pub fn cc_tokens(&self) -> Vec<String> {
        self.cc.split_whitespace().map(str::to_string).collect()
    }

    /// The compiler invocation string quoted for embedding in a single
    /// argument (backslashes and double quotes escaped).
    pub fn quoted_cc(&self) -> String {
        let escaped = self.cc.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    }

    /// Executable file name for `stem` on this platform.
    pub fn executable_filename(&self, stem: &str) -> String {
        match self.platform {
            HostPlatform::Windows => format!("{stem}.exe"),
            _ => stem.to_string(),
        }
    }

    /// Loadable shared-library file name for `stem` on this platform.
    pub fn shared_library_filename(&self, stem: &str) -> String {
        match self.platform {
            HostPlatform::Windows => format!("{stem}.dll"),
            _ => format!("lib{stem}.so"),
        }
    }
}

/// Candidate compiler invocations for `platform`, most preferred first.
fn candidate_compilers(platform: HostPlatform, cc_override: Option<String>) -> Vec<String> {
    let defaults: &[&str] = match platform {
        HostPlatform::Windows => &["cl", "cc", "gcc", "clang"],
        _ => &["cc", "gcc", "clang"],
    };
    cc_override
        .into_iter()
        .chain(defaults.iter().map(|s| s.to_string()))
        .collect()
}

/// Classify a compiler invocation by its executable stem.
fn classify(cc: &str) -> CompilerKind {
    let program = cc.split_whitespace().next().unwrap_or(cc);
    let stem = Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program);
    if stem.eq_ignore_ascii_case("cl") {
        CompilerKind::Msvc
    } else {
        CompilerKind::Generic
    }
}

/// Whether a candidate compiler can be spawned on this host.
fn responds(cc: &str) -> bool {
    let program = match cc.split_whitespace().next() {
        Some(p) => p,
        None => return false,
    };
    Command::new(program)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}
