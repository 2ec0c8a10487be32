//! Timestamp freshness relation.
//!
//! A target is fresh when it exists and is at least as new as every input it
//! depends on. A missing input forces a rebuild rather than erroring here;
//! the stage that consumes the input reports the real problem.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Whether `target` exists and is at least as new as every path in `inputs`.
///
/// A stage runs its side-effecting action iff this returns `false`.
pub fn is_fresh<P: AsRef<Path>>(target: &Path, inputs: &[P]) -> io::Result<bool> {
    let target_mtime = match mtime(target)? {
        Some(t) => t,
        None => return Ok(false),
    };
    for input in inputs {
        match mtime(input.as_ref())? {
            Some(t) if t <= target_mtime => {}
            // Newer input, or missing input: always stale.
            _ => return Ok(false),
        }
    }
    Ok(true)
}

fn mtime(path: &Path) -> io::Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.modified()?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
