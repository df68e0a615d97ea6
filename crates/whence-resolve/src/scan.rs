//! Ordered search-path scan.

use std::path::PathBuf;

use serde::Serialize;
use whence_fs::{EntryKind, UsrMerge, probe_executable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    NotFound,
    File,
    Symlink,
}

/// What one search-path directory holds for the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    pub dir:            PathBuf,
    pub state:          EntryState,
    /// Raw single-hop link text when `state` is `Symlink`.
    pub symlink_target: Option<String>,
    pub shadowed:       bool,
    pub usr_merged:     bool,
}

impl PathEntry {
    pub fn is_match(&self) -> bool { self.state != EntryState::NotFound }

    pub fn candidate(&self, command: &str) -> PathBuf { self.dir.join(command) }
}

#[derive(Debug, Clone, Default)]
pub struct PathScanner {
    merge: UsrMerge,
}

impl PathScanner {
    pub fn new(merge: UsrMerge) -> Self { Self { merge } }

    /// Probes `dir/command` for every directory, in order, without stopping
    /// at the first hit.
    ///
    /// A match is shadowed when `already_won` (a shell mechanism owns the
    /// name) or when an earlier directory already produced the live match.
    pub fn scan(&self, command: &str, dirs: &[PathBuf], already_won: bool) -> Vec<PathEntry> {
        let mut claimed = already_won;

        dirs.iter()
            .map(|dir| {
                let (state, symlink_target) = match probe_executable(&dir.join(command)) {
                    None => (EntryState::NotFound, None),
                    Some(EntryKind::File) => (EntryState::File, None),
                    Some(EntryKind::Symlink { target }) => (EntryState::Symlink, Some(target)),
                };

                let is_match = state != EntryState::NotFound;
                let shadowed = is_match && claimed;
                claimed |= is_match;

                tracing::trace!(dir = %dir.display(), ?state, shadowed, "scanned");
                PathEntry {
                    dir: dir.clone(),
                    state,
                    symlink_target,
                    shadowed,
                    usr_merged: self.merge.is_merged(dir),
                }
            })
            .collect()
    }
}

/// First live (unshadowed) match of a scan.
pub fn winner(entries: &[PathEntry]) -> Option<&PathEntry> {
    entries.iter().find(|e| e.is_match() && !e.shadowed)
}

/// First match of a scan, live or not.
pub fn first_match(entries: &[PathEntry]) -> Option<&PathEntry> {
    entries.iter().find(|e| e.is_match())
}

/// Whether any of `dirs` holds an executable `command`.
pub fn any_executable(command: &str, dirs: &[PathBuf]) -> bool {
    dirs.iter()
        .any(|dir| probe_executable(&dir.join(command)).is_some())
}
