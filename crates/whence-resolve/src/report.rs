//! Full report assembly: validation, resolution and binary inspection.

use std::path::{Path, PathBuf};

use serde::Serialize;
pub use whence_fs::merge::DEFAULT_ALTERNATIVES_DIR;
use whence_fs::{
    Alternative, SymlinkChain, SymlinkHop, UsrMerge, binary, canonical, find_alternative,
};

use crate::precedence::{Mechanism, Resolution, resolve};
use crate::scan::{PathEntry, PathScanner};
use crate::state::ShellState;
use crate::{Error, Result};

/// What the kernel will load for a PATH winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelInfo {
    pub resolved_path:   PathBuf,
    pub canonical_path:  Option<PathBuf>,
    pub symlink_chain:   Vec<SymlinkHop>,
    pub cycle_detected:  bool,
    pub elf_interpreter: Option<String>,
    pub shebang:         Option<String>,
    pub alternatives:    Option<Alternative>,
}

impl KernelInfo {
    /// Inspects `resolved`. Probes that fail leave their field empty.
    pub fn probe(resolved: &Path, alternatives_dirs: &[PathBuf]) -> Self {
        let chain = SymlinkChain::walk(resolved);
        let canonical_path = canonical(resolved);
        let alternatives = find_alternative(&chain, alternatives_dirs);

        let content = canonical_path
            .clone()
            .unwrap_or_else(|| chain.end(resolved));
        let (elf_interpreter, shebang) = match binary::is_elf(&content) {
            Ok(true) => (degrade(binary::elf_interpreter(&content)), None),
            Ok(false) => (None, degrade(binary::shebang(&content))),
            Err(e) => {
                tracing::debug!(error = %e, "content probe skipped");
                (None, None)
            }
        };

        Self {
            resolved_path: resolved.to_path_buf(),
            canonical_path,
            symlink_chain: chain.hops,
            cycle_detected: chain.cycle_detected,
            elf_interpreter,
            shebang,
            alternatives,
        }
    }
}

fn degrade<T>(probe: whence_fs::Result<Option<T>>) -> Option<T> {
    probe.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "probe degraded");
        None
    })
}

/// Resolution of one name plus everything known about its PATH entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub resolution:   Resolution,
    pub path_entries: Vec<PathEntry>,
    pub kernel:       Option<KernelInfo>,
}

/// Rejects names bash would not look up through the tables at all.
pub fn validate_command(command: &str) -> Result<()> {
    let reason = if command.is_empty() {
        "empty name"
    } else if command.contains('/') {
        "contains a path separator"
    } else if command.contains('\0') {
        "contains a NUL byte"
    } else {
        return Ok(());
    };
    Err(Error::InvalidCommand {
        command: command.to_string(),
        reason,
    })
}

/// Produces [`Report`]s. Holds the filesystem layout knobs; the shell state
/// and search path are supplied per call.
#[derive(Debug, Clone)]
pub struct Inspector {
    scanner:           PathScanner,
    alternatives_dirs: Vec<PathBuf>,
}

impl Default for Inspector {
    fn default() -> Self { Self::new() }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            scanner:           PathScanner::default(),
            alternatives_dirs: vec![PathBuf::from(DEFAULT_ALTERNATIVES_DIR)],
        }
    }

    /// Filesystem root used for usr-merge checks.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scanner = PathScanner::new(UsrMerge::new(root));
        self
    }

    pub fn alternatives_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.alternatives_dirs = dirs;
        self
    }

    pub fn inspect(
        &self,
        command: &str,
        state: &ShellState,
        search_path: &[PathBuf],
    ) -> Result<Report> {
        validate_command(command)?;

        let (resolution, path_entries) = resolve(command, state, search_path, &self.scanner);
        let kernel = match (&resolution.winner, &resolution.path.resolved) {
            (Mechanism::Path, Some(resolved)) => {
                Some(KernelInfo::probe(resolved, &self.alternatives_dirs))
            }
            _ => None,
        };

        Ok(Report {
            resolution,
            path_entries,
            kernel,
        })
    }
}
