use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("malformed ELF file {path}: {reason}")]
    MalformedElf { path: PathBuf, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
