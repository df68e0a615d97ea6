pub use error::{Error, Result};

pub mod command;
pub mod config;
pub mod dump;
mod error;
pub mod path;
pub mod shell;
pub mod state;
