//! Where a [`ShellState`] comes from.
//!
//! # Architecture
//!
//! [`StateSource`] is the only contract between the inspector and the
//! shell it describes. The inspector is a mechanism; the source decides
//! which shell session counts.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use whence_resolve::ShellState;

use crate::command::Command;
use crate::dump::{DUMP_SCRIPT, parse_dump};
use crate::error::{Error, Result};

pub trait StateSource {
    fn load(&self) -> Result<ShellState>;
}

/// Reads a dump from a file, or from stdin when the path is `-`.
#[derive(Debug, Clone)]
pub struct DumpSource {
    path: PathBuf,
}

impl DumpSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn stdin() -> Self { Self::new("-") }

    fn read_from_stdin(&self) -> bool { self.path.as_os_str() == "-" }

    fn read(&self) -> io::Result<String> {
        if self.read_from_stdin() {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            Ok(buf)
        } else {
            fs::read_to_string(&self.path)
        }
    }
}

impl StateSource for DumpSource {
    fn load(&self) -> Result<ShellState> {
        let text = self.read().map_err(|source| Error::StateRead {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), bytes = text.len(), "read shell state dump");
        parse_dump(&text)
    }
}

/// Starts a fresh interactive bash and asks it for its tables.
///
/// Aliases and functions defined in rc files are picked up; anything
/// defined only in the caller's live session is not.
#[derive(Debug, Clone)]
pub struct SpawnSource {
    bash:  String,
    posix: bool,
}

impl SpawnSource {
    pub fn new(bash: impl Into<String>) -> Self {
        Self {
            bash:  bash.into(),
            posix: false,
        }
    }

    /// Start bash with `--posix`.
    pub fn posix(mut self, on: bool) -> Self {
        self.posix = on;
        self
    }
}

impl Default for SpawnSource {
    fn default() -> Self { Self::new("bash") }
}

impl StateSource for SpawnSource {
    fn load(&self) -> Result<ShellState> {
        let bash = which::which(&self.bash).map_err(|source| Error::ShellNotFound {
            shell: self.bash.clone(),
            source,
        })?;
        tracing::debug!(bash = %bash.display(), posix = self.posix, "spawning shell for state");

        let mut cmd = Command::new(bash);
        if self.posix {
            cmd = cmd.arg("--posix");
        }
        let stdout = cmd.args(["-i", "-c", DUMP_SCRIPT]).stdin_null().capture_stdout()?;
        parse_dump(&stdout)
    }
}

/// Bash's static keyword and builtin tables, nothing user-defined.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSource {
    posix: bool,
}

impl DefaultSource {
    pub fn new() -> Self { Self::default() }

    pub fn posix(mut self, on: bool) -> Self {
        self.posix = on;
        self
    }
}

impl StateSource for DefaultSource {
    fn load(&self) -> Result<ShellState> { Ok(ShellState::bash().posix(self.posix)) }
}

/// Tries `primary`, and on failure logs a warning and asks `fallback`.
#[derive(Debug, Clone)]
pub struct FallbackSource<A, B> {
    primary:  A,
    fallback: B,
}

impl<A, B> FallbackSource<A, B>
where
    A: StateSource,
    B: StateSource,
{
    pub fn new(primary: A, fallback: B) -> Self { Self { primary, fallback } }
}

impl<A, B> StateSource for FallbackSource<A, B>
where
    A: StateSource,
    B: StateSource,
{
    fn load(&self) -> Result<ShellState> {
        self.primary.load().or_else(|err| {
            tracing::warn!(error = %err, "could not capture shell state, using defaults");
            self.fallback.load()
        })
    }
}

impl<S: StateSource + ?Sized> StateSource for Box<S> {
    fn load(&self) -> Result<ShellState> { (**self).load() }
}
