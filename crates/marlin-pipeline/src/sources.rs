//! Source aggregation.
//!
//! Walks a source tree and collects every file with a matching suffix into a
//! deterministic, duplicate-free build set. Pure traversal: whatever exists
//! on disk at call time is what the linker sees, which is how generated
//! sources join the build once the grammar transform has run.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Recursively collect files under `root` whose extension is in
/// `extensions`, sorted for reproducible builds.
pub fn collect_sources(root: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut set = BTreeSet::new();
    visit(root, extensions, &mut set)?;
    Ok(set.into_iter().collect())
}

fn visit(dir: &Path, extensions: &[&str], out: &mut BTreeSet<PathBuf>) -> io::Result<()> {
    for entry in dir.read_dir()? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            visit(&path, extensions, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e))
        {
            out.insert(path);
        }
    }
    Ok(())
}
