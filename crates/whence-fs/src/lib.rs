//! Blocking filesystem probes used to explain how a command name reaches an
//! executable: executability checks, symlink chains, ELF interpreters,
//! shebang lines, distro alternatives and usr-merge detection.
//!
//! Every probe here is read-only. Probes that inspect file contents return
//! [`Result`] so callers can decide how to degrade; the resolver folds
//! failures into "no value" fields.

mod error;

pub mod binary;
pub mod chain;
pub mod merge;
pub mod probe;

pub use binary::{elf_interpreter, shebang};
pub use chain::{MAX_HOPS, SymlinkChain, SymlinkHop, canonical};
pub use error::{Error, Result};
pub use merge::{Alternative, UsrMerge, find_alternative};
pub use probe::{EntryKind, probe_executable};
