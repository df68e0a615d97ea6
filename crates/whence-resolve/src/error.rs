//! Error types for resolution.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid command name '{command}': {reason}")]
    InvalidCommand {
        command: String,
        reason:  &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
