use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported shell: {0}")]
    UnsupportedShell(String),

    #[error("shell executable not found: {shell}")]
    ShellNotFound {
        shell:  String,
        source: which::Error,
    },

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("command exited with {status}: {cmd}")]
    CommandExited { cmd: String, status: std::process::ExitStatus },

    #[error("malformed shell state dump, line {line}: {reason}")]
    MalformedDump { line: usize, reason: String },

    #[error("failed to read shell state from {path}: {source}")]
    StateRead {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self { Self::Config(Box::new(err)) }
}
