//! Per-directory executable probe.

use std::fs;
use std::path::Path;

use nix::unistd::{AccessFlags, access};
use serde::Serialize;

/// How a runnable candidate appears in its directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    File,
    /// The candidate is itself a link; `target` is the raw single-hop text.
    Symlink { target: String },
}

/// Checks whether `path` is something the shell would run from a PATH lookup.
///
/// The candidate must exist, resolve (through any symlinks) to a regular file
/// and be executable by the current user. Returns `None` otherwise.
pub fn probe_executable(path: &Path) -> Option<EntryKind> {
    let link_meta = fs::symlink_metadata(path).ok()?;

    // stat follows the whole chain, the same way execve does
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "dangling or looping candidate");
            return None;
        }
    };
    if !meta.is_file() {
        return None;
    }
    if access(path, AccessFlags::X_OK).is_err() {
        tracing::debug!(path = %path.display(), "candidate is not executable");
        return None;
    }

    if link_meta.file_type().is_symlink() {
        let target = fs::read_link(path).ok()?;
        Some(EntryKind::Symlink {
            target: target.to_string_lossy().into_owned(),
        })
    } else {
        Some(EntryKind::File)
    }
}
