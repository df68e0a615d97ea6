use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use whence_platform::config::ColorChoice;
use whence_platform::path::Widen;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "whence",
    version = env!("CARGO_PKG_VERSION"),
    about = "Explain how bash resolves a command name",
    long_about = None,
    subcommand_negates_reqs = true
)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    #[command(flatten)]
    pub inspect: InspectArgs,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Print shell code that passes the live session to whence
    Init {
        /// Target shell (only bash is supported)
        shell: String,
    },
    /// Print a completion script
    Completions { shell: clap_complete::Shell },
}

#[derive(Clone, Debug, Args)]
pub struct InspectArgs {
    /// Command names to inspect
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// When to append administrative directories to PATH
    #[arg(long, value_name = "POLICY")]
    pub widen: Option<Widen>,

    /// Same as --widen always
    #[arg(long, conflicts_with = "widen")]
    pub sbin: bool,

    /// Read the shell state dump from FILE, or stdin with '-'
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Use bash's built-in tables only, without aliases or functions.
    /// Overrides an earlier --state
    #[arg(long, overrides_with = "state")]
    pub no_shell: bool,

    /// Resolve as bash in POSIX mode
    #[arg(long)]
    pub posix: bool,

    #[arg(long, value_name = "WHEN")]
    pub color: Option<ColorChoice>,
}

impl InspectArgs {
    pub fn widen_policy(&self, configured: Widen) -> Widen {
        if self.sbin { Widen::Always } else { self.widen.unwrap_or(configured) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() { App::command().debug_assert(); }

    #[test]
    fn test_names_and_flags() {
        let app = App::try_parse_from(["whence", "--json", "--sbin", "ls", "cd"]).unwrap();
        assert!(app.cmd.is_none());
        assert_eq!(app.inspect.names, ["ls", "cd"]);
        assert!(app.inspect.json);
        assert_eq!(app.inspect.widen_policy(Widen::Never), Widen::Always);
    }

    #[test]
    fn test_widen_falls_back_to_config() {
        let app = App::try_parse_from(["whence", "ls"]).unwrap();
        assert_eq!(app.inspect.widen_policy(Widen::Never), Widen::Never);
        let app = App::try_parse_from(["whence", "--widen", "auto", "ls"]).unwrap();
        assert_eq!(app.inspect.widen_policy(Widen::Never), Widen::Auto);
    }

    #[test]
    fn test_names_required() {
        assert!(App::try_parse_from(["whence"]).is_err());
    }

    #[test]
    fn test_sbin_conflicts_with_widen() {
        assert!(App::try_parse_from(["whence", "--sbin", "--widen", "never", "ls"]).is_err());
    }

    #[test]
    fn test_no_shell_after_piped_state() {
        let app = App::try_parse_from(["whence", "--state", "-", "--no-shell", "ls"]).unwrap();
        assert!(app.cmd.is_none());
        assert!(app.inspect.no_shell);
        assert_eq!(app.inspect.state, None);
        assert_eq!(app.inspect.names, ["ls"]);
    }

    #[test]
    fn test_subcommand_after_piped_state() {
        let app = App::try_parse_from(["whence", "--state", "-", "completions", "bash"]).unwrap();
        assert!(matches!(
            app.cmd,
            Some(Commands::Completions {
                shell: clap_complete::Shell::Bash
            })
        ));
        assert!(app.inspect.names.is_empty());

        let app = App::try_parse_from(["whence", "--state", "-", "init", "bash"]).unwrap();
        assert!(matches!(app.cmd, Some(Commands::Init { ref shell }) if shell == "bash"));
    }

    #[test]
    fn test_double_dash_inspects_subcommand_names() {
        let app = App::try_parse_from(["whence", "--", "init"]).unwrap();
        assert!(app.cmd.is_none());
        assert_eq!(app.inspect.names, ["init"]);
    }

    #[test]
    fn test_subcommands() {
        let app = App::try_parse_from(["whence", "init", "bash"]).unwrap();
        assert!(matches!(app.cmd, Some(Commands::Init { ref shell }) if shell == "bash"));
        let app = App::try_parse_from(["whence", "-v", "completions", "zsh"]).unwrap();
        assert!(matches!(app.cmd, Some(Commands::Completions { .. })));
        assert_eq!(app.verbose, 1);
    }
}
