use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command as StdCommand, Output, Stdio};

/// Thin builder over [`std::process::Command`] that remembers the program
/// name for error messages.
#[derive(Debug)]
pub struct Command {
    inner:   StdCommand,
    program: String,
}

impl Command {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        Self {
            inner:   StdCommand::new(&program),
            program: program.to_string_lossy().into_owned(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    /// Detach stdin so an interactive child cannot block on the terminal.
    pub fn stdin_null(mut self) -> Self {
        self.inner.stdin(Stdio::null());
        self
    }

    pub fn capture(mut self) -> Result<Output> {
        self.inner.output().map_err(|e| Error::CommandFailed {
            cmd:    self.program.clone(),
            source: e,
        })
    }

    /// Runs to completion and returns stdout, failing on a non-zero exit.
    pub fn capture_stdout(self) -> Result<String> {
        let cmd = self.program.clone();
        let output = self.capture()?;
        if !output.status.success() {
            tracing::debug!(
                cmd = %cmd,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "command failed"
            );
            return Err(Error::CommandExited {
                cmd,
                status: output.status,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new() {
        let cmd = Command::new("bash");
        assert_eq!(cmd.program, "bash");
    }

    #[test]
    fn test_command_args() {
        let cmd = Command::new("bash").arg("-c").args(["true", "x"]);
        let args: Vec<_> = cmd.inner.get_args().collect();
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_capture_stdout_missing_program() {
        let result = Command::new("whence-test-no-such-program-12345").capture_stdout();
        assert!(matches!(result, Err(Error::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_stdout_nonzero_exit() {
        let result = Command::new("sh").args(["-c", "exit 3"]).capture_stdout();
        assert!(matches!(result, Err(Error::CommandExited { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_stdout_ok() {
        let out = Command::new("sh")
            .args(["-c", "printf hello"])
            .capture_stdout()
            .unwrap();
        assert_eq!(out, "hello");
    }
}
