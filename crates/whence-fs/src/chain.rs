//! Symlink chain traversal and canonicalization.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Same limit the Linux kernel applies before failing with `ELOOP`.
pub const MAX_HOPS: usize = 40;

/// One `readlink` step: `source` points at `target` (raw link text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymlinkHop {
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymlinkChain {
    pub hops:           Vec<SymlinkHop>,
    pub cycle_detected: bool,
}

impl SymlinkChain {
    /// Follows `start` one hop at a time until a non-link is reached.
    ///
    /// Relative link text is joined onto the link's parent directory without
    /// further normalisation, so every recorded source is a path that was
    /// actually read. A source seen twice, or more than [`MAX_HOPS`] hops,
    /// ends the walk with `cycle_detected` set.
    pub fn walk(start: &Path) -> Self {
        let mut chain = Self::default();
        let mut visited = HashSet::new();
        let mut current = start.to_path_buf();

        loop {
            let is_link = fs::symlink_metadata(&current)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            if !is_link {
                break;
            }
            if !visited.insert(current.clone()) || chain.hops.len() >= MAX_HOPS {
                tracing::debug!(path = %current.display(), "symlink cycle");
                chain.cycle_detected = true;
                break;
            }

            let target = match fs::read_link(&current) {
                Ok(target) => target,
                Err(e) => {
                    tracing::debug!(path = %current.display(), error = %e, "readlink failed");
                    break;
                }
            };
            let next = if target.is_absolute() {
                target.clone()
            } else {
                current
                    .parent()
                    .map(|parent| parent.join(&target))
                    .unwrap_or_else(|| target.clone())
            };

            chain.hops.push(SymlinkHop {
                source: current,
                target,
            });
            current = next;
        }

        chain
    }

    pub fn is_empty(&self) -> bool { self.hops.is_empty() }

    /// The last path reached by the walk, or `start` when it was not a link.
    pub fn end(&self, start: &Path) -> PathBuf {
        match self.hops.last() {
            Some(hop) if hop.target.is_absolute() => hop.target.clone(),
            Some(hop) => hop
                .source
                .parent()
                .map(|parent| parent.join(&hop.target))
                .unwrap_or_else(|| hop.target.clone()),
            None => start.to_path_buf(),
        }
    }
}

/// Fully resolved real path, or `None` when resolution fails.
pub fn canonical(path: &Path) -> Option<PathBuf> {
    match fs::canonicalize(path) {
        Ok(real) => Some(real),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "canonicalize failed");
            None
        }
    }
}
