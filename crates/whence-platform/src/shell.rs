//! Shell detection and the integration snippet for interactive shells.

use std::fmt;
use std::str::FromStr;

pub use query_shell::Shell as QueryShell;

use crate::dump::DUMP_SCRIPT;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
    Nushell,
    Elvish,
    Ion,
    Xonsh,
    Unknown,
}

impl Shell {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Fish => "fish",
            Self::Powershell => "powershell",
            Self::Nushell => "nu",
            Self::Elvish => "elvish",
            Self::Ion => "ion",
            Self::Xonsh => "xonsh",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Shell {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "bash" => Self::Bash,
            "zsh" => Self::Zsh,
            "fish" => Self::Fish,
            "powershell" | "pwsh" => Self::Powershell,
            "nu" | "nushell" => Self::Nushell,
            "elvish" => Self::Elvish,
            "ion" => Self::Ion,
            "xonsh" => Self::Xonsh,
            other => return Err(Error::UnsupportedShell(other.to_string())),
        })
    }
}

fn from_query_shell(qs: QueryShell) -> Shell {
    match qs {
        QueryShell::Bash => Shell::Bash,
        QueryShell::Zsh => Shell::Zsh,
        QueryShell::Fish => Shell::Fish,
        QueryShell::Powershell => Shell::Powershell,
        QueryShell::Nushell => Shell::Nushell,
        QueryShell::Elvish => Shell::Elvish,
        QueryShell::Ion => Shell::Ion,
        QueryShell::Xonsh => Shell::Xonsh,
        _ => Shell::Unknown,
    }
}

/// Detect the shell that started this process.
///
/// Returns `None` if detection fails.
pub fn detect() -> Option<Shell> {
    let shell = query_shell::get_shell().ok().map(from_query_shell);
    tracing::trace!(?shell, "detected parent shell");
    shell
}

/// Subcommands the `init` wrapper passes through without a state dump.
const PASSTHROUGH_SUBCOMMANDS: &[&str] = &["init", "completions"];

/// Shell code that defines a `whence` function feeding the live session's
/// state to the binary on stdin. Subcommands are passed through untouched.
///
/// Only bash has the aliases, functions and builtins this tool models.
pub fn init_script(shell: Shell) -> Result<String> {
    match shell {
        Shell::Bash => Ok(format!(
            "whence() {{\n    case \"$1\" in\n        {}) command whence \"$@\" ;;\n        \
             *) command whence --state - \"$@\" < <(\n{DUMP_SCRIPT}\n        ) ;;\n    esac\n}}\n",
            PASSTHROUGH_SUBCOMMANDS.join("|")
        )),
        other => Err(Error::UnsupportedShell(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("Bash".parse::<Shell>().unwrap(), Shell::Bash);
        assert_eq!("pwsh".parse::<Shell>().unwrap(), Shell::Powershell);
        assert!(matches!("tcsh".parse::<Shell>(), Err(Error::UnsupportedShell(_))));
    }

    #[test]
    fn test_init_bash() {
        let script = init_script(Shell::Bash).unwrap();
        assert!(script.starts_with("whence() {"));
        assert!(script.contains("command whence --state - \"$@\""));
        assert!(script.contains("@@aliases"));
        assert!(script.trim_end().ends_with('}'));
    }

    #[test]
    fn test_init_bash_passes_subcommands_through() {
        let script = init_script(Shell::Bash).unwrap();
        assert!(script.contains("case \"$1\" in"));
        assert!(script.contains("init|completions) command whence \"$@\" ;;"));
        let dispatch = script.find("init|completions)").unwrap();
        let piped = script.find("--state -").unwrap();
        assert!(dispatch < piped);
    }

    #[test]
    fn test_init_other_shells_rejected() {
        for shell in [Shell::Zsh, Shell::Fish, Shell::Unknown] {
            assert!(matches!(init_script(shell), Err(Error::UnsupportedShell(_))));
        }
    }

    #[test]
    fn test_detect_does_not_panic() {
        let _ = detect();
    }
}
