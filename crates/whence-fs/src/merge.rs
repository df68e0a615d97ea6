//! Distro layout detection: usr-merge and the alternatives system.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::chain::{SymlinkChain, canonical};

/// Root-level directories that usr-merge folds into `/usr`.
pub const LEGACY_ROOT_DIRS: &[&str] = &["bin", "sbin", "lib", "lib32", "lib64", "libx32"];

pub const DEFAULT_ALTERNATIVES_DIR: &str = "/etc/alternatives";

/// Detects whether a legacy root directory is the same directory as its
/// `usr` counterpart.
#[derive(Debug, Clone)]
pub struct UsrMerge {
    root: PathBuf,
}

impl Default for UsrMerge {
    fn default() -> Self { Self::new("/") }
}

impl UsrMerge {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    /// `<root>/usr/<name>` when `dir` is one of `<root>/{bin,sbin,lib,..}`.
    pub fn counterpart(&self, dir: &Path) -> Option<PathBuf> {
        let dir = strip_trailing(dir);
        let name = dir.file_name()?.to_str()?;
        if dir.parent()? != self.root.as_path() || !LEGACY_ROOT_DIRS.contains(&name) {
            return None;
        }
        Some(self.root.join("usr").join(name))
    }

    /// True when `dir` is a legacy root directory identical to its `usr`
    /// counterpart, either by symlink or by `(dev, ino)`.
    pub fn is_merged(&self, dir: &Path) -> bool {
        let Some(usr_dir) = self.counterpart(dir) else {
            return false;
        };

        match (canonical(dir), canonical(&usr_dir)) {
            (Some(a), Some(b)) if a == b => return true,
            (None, _) | (_, None) => return false,
            _ => {}
        }

        // bind mounts keep distinct paths but share the inode
        match (fs::metadata(dir), fs::metadata(&usr_dir)) {
            (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        }
    }
}

fn strip_trailing(dir: &Path) -> PathBuf {
    // Path::components drops a trailing separator, `/bin/` -> `/bin`
    dir.components().collect()
}

/// Resolves `.` and `..` without touching the filesystem.
fn lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// A hop through the alternatives directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub link:   PathBuf,
    pub target: PathBuf,
}

/// First hop whose source lives under one of `alternatives_dirs`.
///
/// The link is reported with `..` components folded away. The target is the
/// fully resolved path of that link, falling back to the raw link text when
/// the rest of the chain does not resolve.
pub fn find_alternative(chain: &SymlinkChain, alternatives_dirs: &[PathBuf]) -> Option<Alternative> {
    chain.hops.iter().find_map(|hop| {
        let link = lexical(&hop.source);
        if !alternatives_dirs.iter().any(|dir| link.starts_with(lexical(dir))) {
            return None;
        }
        let target = canonical(&hop.source).unwrap_or_else(|| hop.target.clone());
        Some(Alternative { link, target })
    })
}
