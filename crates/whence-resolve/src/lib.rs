//! Explains how bash would run a bare command name.
//!
//! # Architecture
//!
//! Resolution is a pure function of three inputs: the command name, an
//! immutable [`ShellState`] snapshot and an ordered search path. Nothing here
//! talks to a live shell; producing the snapshot is the caller's business.
//!
//! 1. [`precedence::resolve`] applies bash's lookup order and records which
//!    mechanisms exist but lose ("shadowed").
//! 2. [`scan::PathScanner`] walks every search-path directory, always to the
//!    end, so later duplicates are reported too.
//! 3. When a PATH executable wins, [`KernelInfo`] describes what the kernel
//!    will actually load.
//!
//! # Example
//!
//! ```
//! use whence_resolve::{Inspector, Mechanism, ShellState};
//!
//! let state = ShellState::bash().with_alias("ll", "ls -l");
//! let report = Inspector::new().inspect("ll", &state, &[]).unwrap();
//! assert_eq!(report.resolution.winner, Mechanism::Alias);
//! assert!(report.kernel.is_none());
//! ```

pub use error::{Error, Result};
pub use precedence::{Mechanism, Resolution, resolve};
pub use report::{Inspector, KernelInfo, Report, validate_command};
pub use scan::{EntryState, PathEntry, PathScanner};
pub use state::{FunctionSource, ShellState};

mod error;
pub mod precedence;
pub mod report;
pub mod scan;
pub mod state;
