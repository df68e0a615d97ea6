//! The directory list the path lookup walks, and optional widening with
//! administrative directories.
//!
//! Widening never touches the process environment: it produces a new
//! [`SearchPath`] value that is handed to the resolver.

use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use whence_resolve::scan::any_executable;

pub const DEFAULT_ADMIN_DIRS: &[&str] = &[
    "/usr/local/sbin",
    "/usr/sbin",
    "/sbin",
    "/snap/bin",
    "/var/lib/flatpak/exports/bin",
];

fn paths_equal(p1: &Path, p2: &Path) -> bool {
    fn normalize(p: &Path) -> &str {
        let s = p.to_str().unwrap_or_default();
        let trimmed = s.trim_end_matches('/');
        if trimmed.is_empty() && !s.is_empty() { "/" } else { trimmed }
    }
    match (p1.to_str(), p2.to_str()) {
        (Some(_), Some(_)) => normalize(p1) == normalize(p2),
        _ => p1 == p2,
    }
}

/// When administrative directories are appended to the search path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Widen {
    Never,
    /// Only when the command is missing from the base path but present in
    /// an administrative directory.
    #[default]
    Auto,
    Always,
}

impl FromStr for Widen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            other => Err(format!("unknown widen policy '{other}' (expected never, auto or always)")),
        }
    }
}

impl fmt::Display for Widen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Never => "never",
            Self::Auto => "auto",
            Self::Always => "always",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self { Self { dirs } }

    /// The current `PATH`; empty when unset.
    pub fn from_env() -> Self {
        env::var_os("PATH").map(|val| Self::parse(&val)).unwrap_or_default()
    }

    /// Splits a `PATH`-style value. Empty elements are kept as-is.
    pub fn parse(value: &OsStr) -> Self { Self::new(env::split_paths(value).collect()) }

    pub fn admin_dirs() -> Vec<PathBuf> {
        DEFAULT_ADMIN_DIRS.iter().map(PathBuf::from).collect()
    }

    pub fn dirs(&self) -> &[PathBuf] { &self.dirs }

    pub fn contains(&self, path: &Path) -> bool { self.dirs.iter().any(|p| paths_equal(p, path)) }

    /// Appends every directory in `extra` that is not already present.
    pub fn widen(mut self, extra: &[PathBuf]) -> Self {
        for dir in extra {
            if !self.contains(dir) {
                self.dirs.push(dir.clone());
            }
        }
        self
    }

    /// Applies `policy` for `command`. The flag reports whether any
    /// directory was actually added.
    pub fn widen_for(&self, command: &str, admin: &[PathBuf], policy: Widen) -> (Self, bool) {
        let apply = match policy {
            Widen::Never => false,
            Widen::Always => true,
            Widen::Auto => {
                !any_executable(command, &self.dirs) && any_executable(command, admin)
            }
        };
        if !apply {
            return (self.clone(), false);
        }
        let widened = self.clone().widen(admin);
        let changed = widened.dirs.len() != self.dirs.len();
        if changed {
            tracing::debug!(command, ?policy, added = widened.dirs.len() - self.dirs.len(), "widened search path");
        }
        (widened, changed)
    }
}
