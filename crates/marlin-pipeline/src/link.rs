//! Extension linking.
//!
//! Hands the aggregated source set to the host toolchain: object compilation
//! goes through `cc::Build` (which owns per-object concerns), then a single
//! compiler invocation links the loadable shared library. Include paths must
//! cover both the generated headers and the hand-written ones; preprocessor
//! defines identify the embedding mode.

use std::fs;
use std::path::{Path, PathBuf};

use marlin_toolchain::{CompilerKind, Toolchain};

use crate::error::{PipelineError, Result};
use crate::exec;

/// Compile `sources` and link them into the shared library at `output`.
///
/// Returns the artifact path. Any compiler or linker failure is fatal.
pub fn link_extension(
    tc: &Toolchain,
    sources: &[PathBuf],
    include_dirs: &[PathBuf],
    defines: &[String],
    output: &Path,
) -> Result<PathBuf> {
    if sources.is_empty() {
        return Err(PipelineError::Link {
            message: "no compilable sources found".to_string(),
            status: 1,
        });
    }
    let obj_dir = output.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(obj_dir)?;

    let objects = compile_objects(tc, sources, include_dirs, defines, obj_dir)?;

    let tokens = link_command(tc, &objects, output);
    let command = exec::render(&tokens);
    println!("{command}");
    let status = exec::run(&tokens, None)?;
    if status != 0 {
        return Err(PipelineError::Link {
            message: command,
            status,
        });
    }
    Ok(output.to_path_buf())
}

/// Compile each source to an object file in `obj_dir` via `cc::Build`.
fn compile_objects(
    tc: &Toolchain,
    sources: &[PathBuf],
    include_dirs: &[PathBuf],
    defines: &[String],
    obj_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut build = cc::Build::new();
    // Not running under cargo: everything a build script would read from the
    // environment has to be supplied explicitly.
    build
        .cargo_metadata(false)
        .warnings(false)
        .opt_level(2)
        .debug(false)
        .host(host_triple(tc))
        .target(host_triple(tc))
        .out_dir(obj_dir);
    let cc_tokens = tc.cc_tokens();
    if let Some((program, leading_args)) = cc_tokens.split_first() {
        build.compiler(program);
        for arg in leading_args {
            build.flag(arg);
        }
    }
    if tc.kind == CompilerKind::Generic {
        build.pic(true);
    }
    for dir in include_dirs {
        build.include(dir);
    }
    for define in defines {
        match define.split_once('=') {
            Some((name, value)) => build.define(name, value),
            None => build.define(define, None),
        };
    }
    for source in sources {
        build.file(source);
    }

    build
        .try_compile_intermediates()
        .map_err(|e| PipelineError::Link {
            message: e.to_string(),
            status: 1,
        })
}

/// Command line linking `objects` into the shared library `output`.
pub fn link_command(tc: &Toolchain, objects: &[PathBuf], output: &Path) -> Vec<String> {
    let mut tokens = tc.cc_tokens();
    match tc.kind {
        CompilerKind::Msvc => {
            tokens.push("/LD".to_string());
            tokens.extend(objects.iter().map(|o| o.display().to_string()));
            tokens.push(format!("/Fe{}", output.display()));
        }
        CompilerKind::Generic => {
            tokens.push("-shared".to_string());
            tokens.extend(objects.iter().map(|o| o.display().to_string()));
            tokens.push("-o".to_string());
            tokens.push(output.display().to_string());
        }
    }
    tokens
}

/// The triple handed to `cc::Build`; marlin only ever compiles for the host.
fn host_triple(tc: &Toolchain) -> &'static str {
    if cfg!(all(target_os = "windows", target_arch = "x86_64")) {
        match tc.kind {
            CompilerKind::Msvc => "x86_64-pc-windows-msvc",
            CompilerKind::Generic => "x86_64-pc-windows-gnu",
        }
    } else if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        "aarch64-apple-darwin"
    } else if cfg!(all(target_os = "macos", target_arch = "x86_64")) {
        "x86_64-apple-darwin"
    } else if cfg!(all(target_os = "linux", target_arch = "aarch64")) {
        "aarch64-unknown-linux-gnu"
    } else {
        "x86_64-unknown-linux-gnu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlin_toolchain::HostPlatform as Hp;

    fn toolchain(cc: &str, kind: CompilerKind, platform: Hp) -> Toolchain {
        Toolchain {
            cc: cc.to_string(),
            kind,
            platform,
            base_cflags: String::new(),
        }
    }

    #[test]
    fn generic_link_command() {
        let tc = toolchain("cc", CompilerKind::Generic, Hp::Unix);
        let objects = vec![PathBuf::from("out/a.o"), PathBuf::from("out/b.o")];
        let tokens = link_command(&tc, &objects, Path::new("out/libext.so"));
        assert_eq!(
            tokens,
            vec!["cc", "-shared", "out/a.o", "out/b.o", "-o", "out/libext.so"]
        );
    }

    #[test]
    fn msvc_link_command() {
        let tc = toolchain("cl", CompilerKind::Msvc, Hp::Windows);
        let objects = vec![PathBuf::from("out\\a.obj")];
        let tokens = link_command(&tc, &objects, Path::new("out\\ext.dll"));
        assert_eq!(tokens, vec!["cl", "/LD", "out\\a.obj", "/Feout\\ext.dll"]);
    }

    #[test]
    fn empty_source_set_is_an_error() {
        let tc = toolchain("cc", CompilerKind::Generic, Hp::Unix);
        let err = link_extension(&tc, &[], &[], &[], Path::new("out/libext.so")).unwrap_err();
        assert!(matches!(err, PipelineError::Link { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn links_a_real_shared_library_when_a_compiler_exists() {
        let tc = match Toolchain::resolve() {
            Ok(tc) if tc.kind == CompilerKind::Generic => tc,
            _ => {
                eprintln!("skipping: no generic C compiler on this host");
                return;
            }
        };
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("ext.c");
        std::fs::write(
            &src,
            "#include \"feature.h\"\nint ext_entry(void) { return EXT_MODE; }\n",
        )
        .unwrap();
        let include = dir.path().join("include");
        std::fs::create_dir(&include).unwrap();
        std::fs::write(include.join("feature.h"), "#define EXT_MODE 1\n").unwrap();

        let out = dir.path().join("out").join(tc.shared_library_filename("ext"));
        let artifact = link_extension(
            &tc,
            &[src],
            &[include],
            &["EXT_EMBEDDED".to_string()],
            &out,
        )
        .unwrap();
        assert!(artifact.exists());
    }

    #[test]
    fn host_triple_matches_build_platform() {
        let tc = toolchain("cc", CompilerKind::Generic, Hp::current());
        let triple = host_triple(&tc);
        if cfg!(target_os = "linux") {
            assert!(triple.contains("linux"));
        }
    }
}
