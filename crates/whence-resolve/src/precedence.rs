//! Bash's name lookup order.
//!
//! Bash parses before it looks names up, so reserved tokens and keywords are
//! settled first; POSIX mode then pins the special builtins above functions.
//! The full order, first applicable rule wins:
//!
//! | # | rule                                           | winner   |
//! |---|------------------------------------------------|----------|
//! | 1 | name is a syntax token                         | keyword  |
//! | 2 | POSIX mode, special builtin, builtin enabled   | builtin  |
//! | 3 | name is a reserved word                        | keyword  |
//! | 4 | alias                                          | alias    |
//! | 5 | function                                       | function |
//! | 6 | enabled builtin                                | builtin  |
//! | 7 | first executable in the search path            | path     |
//!
//! Each rule is evaluated once. A mechanism that exists but does not win is
//! shadowed, except a disabled builtin, which is reported as disabled.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::scan::{self, PathEntry, PathScanner};
use crate::state::{FunctionSource, ShellState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    Alias,
    Function,
    Keyword,
    Builtin,
    Path,
    NotFound,
}

impl Mechanism {
    pub const ALL: [Mechanism; 6] = [
        Self::Alias,
        Self::Function,
        Self::Keyword,
        Self::Builtin,
        Self::Path,
        Self::NotFound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::Function => "function",
            Self::Keyword => "keyword",
            Self::Builtin => "builtin",
            Self::Path => "path",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AliasStatus {
    pub found:      bool,
    pub shadowed:   bool,
    pub definition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionStatus {
    pub found:    bool,
    pub shadowed: bool,
    pub source:   Option<FunctionSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordStatus {
    pub found:        bool,
    pub shadowed:     bool,
    pub syntax_token: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuiltinStatus {
    pub found:    bool,
    pub shadowed: bool,
    pub enabled:  Option<bool>,
    pub special:  bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathStatus {
    pub found:    bool,
    pub shadowed: bool,
    /// `dir/command` of the first match in search order.
    pub resolved: Option<PathBuf>,
}

/// Outcome of the precedence rules for one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub command:  String,
    pub winner:   Mechanism,
    pub alias:    AliasStatus,
    pub function: FunctionStatus,
    pub keyword:  KeywordStatus,
    pub builtin:  BuiltinStatus,
    pub path:     PathStatus,
}

impl Resolution {
    pub fn is_found(&self) -> bool { self.winner != Mechanism::NotFound }

    /// Mechanisms that exist for this name but lose to the winner.
    pub fn shadowed(&self) -> Vec<Mechanism> {
        [
            (Mechanism::Alias, self.alias.shadowed),
            (Mechanism::Function, self.function.shadowed),
            (Mechanism::Keyword, self.keyword.shadowed),
            (Mechanism::Builtin, self.builtin.shadowed),
            (Mechanism::Path, self.path.shadowed),
        ]
        .into_iter()
        .filter_map(|(m, shadowed)| shadowed.then_some(m))
        .collect()
    }
}

/// Runs the lookup order for `command`, scanning `search_path` with
/// `scanner`. Returns the resolution and every scanned entry.
///
/// `command` must already be a valid bare name; see
/// [`crate::validate_command`].
pub fn resolve(
    command: &str,
    state: &ShellState,
    search_path: &[PathBuf],
    scanner: &PathScanner,
) -> (Resolution, Vec<PathEntry>) {
    let alias = state.aliases.get(command);
    let function = state.functions.get(command);
    let builtin_enabled = state.builtins.get(command).copied();
    let is_token = state.syntax_tokens.contains(command);
    let is_keyword = state.keywords.contains(command);
    let is_special = state.is_special_builtin(command);

    let rules = [
        (Mechanism::Keyword, is_token),
        (
            Mechanism::Builtin,
            state.posix_mode && is_special && builtin_enabled == Some(true),
        ),
        (Mechanism::Keyword, is_keyword),
        (Mechanism::Alias, alias.is_some()),
        (Mechanism::Function, function.is_some()),
        (Mechanism::Builtin, builtin_enabled == Some(true)),
    ];
    let shell_winner = rules
        .iter()
        .find_map(|&(mechanism, applies)| applies.then_some(mechanism));

    let entries = scanner.scan(command, search_path, shell_winner.is_some());
    let winner = match (shell_winner, scan::winner(&entries)) {
        (Some(mechanism), _) => mechanism,
        (None, Some(_)) => Mechanism::Path,
        (None, None) => Mechanism::NotFound,
    };
    let loses = |mechanism: Mechanism, found: bool| found && winner != mechanism;

    let path_match = scan::first_match(&entries);
    let keyword_found = is_token || is_keyword;
    let resolution = Resolution {
        command: command.to_string(),
        winner,
        alias: AliasStatus {
            found:      alias.is_some(),
            shadowed:   loses(Mechanism::Alias, alias.is_some()),
            definition: alias.cloned(),
        },
        function: FunctionStatus {
            found:    function.is_some(),
            shadowed: loses(Mechanism::Function, function.is_some()),
            source:   function.cloned(),
        },
        keyword: KeywordStatus {
            found:        keyword_found,
            shadowed:     loses(Mechanism::Keyword, keyword_found),
            syntax_token: is_token,
        },
        builtin: BuiltinStatus {
            found:    builtin_enabled.is_some(),
            shadowed: loses(Mechanism::Builtin, builtin_enabled == Some(true)),
            enabled:  builtin_enabled,
            special:  is_special,
        },
        path: PathStatus {
            found:    path_match.is_some(),
            shadowed: loses(Mechanism::Path, path_match.is_some()),
            resolved: path_match.map(|e| e.candidate(command)),
        },
    };

    tracing::debug!(
        command,
        winner = %resolution.winner,
        shadowed = ?resolution.shadowed(),
        "resolved"
    );
    (resolution, entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(command: &str, state: &ShellState) -> Resolution {
        resolve(command, state, &[], &PathScanner::default()).0
    }

    #[test]
    fn test_syntax_token_beats_everything() {
        let state = ShellState::bash()
            .with_alias("[[", "echo nope")
            .with_function("[[", "x", 1);
        let r = run("[[", &state);
        assert_eq!(r.winner, Mechanism::Keyword);
        assert!(r.keyword.syntax_token);
        assert!(r.alias.shadowed);
        assert!(r.function.shadowed);
    }

    #[test]
    fn test_dot_is_a_syntax_token_even_in_posix_mode() {
        let r = run(".", &ShellState::bash().posix(true));
        assert_eq!(r.winner, Mechanism::Keyword);
        assert!(r.builtin.found);
        assert!(r.builtin.shadowed);
        assert!(r.builtin.special);
    }

    #[test]
    fn test_keyword_shadows_alias() {
        let r = run("if", &ShellState::bash().with_alias("if", "echo"));
        assert_eq!(r.winner, Mechanism::Keyword);
        assert!(!r.keyword.syntax_token);
        assert!(r.alias.found);
        assert!(r.alias.shadowed);
        assert_eq!(r.alias.definition.as_deref(), Some("echo"));
    }

    #[test]
    fn test_alias_beats_function_and_builtin() {
        let state = ShellState::bash()
            .with_alias("cd", "pushd")
            .with_function("cd", "~/.bashrc", 40);
        let r = run("cd", &state);
        assert_eq!(r.winner, Mechanism::Alias);
        assert!(r.function.shadowed);
        assert!(r.builtin.shadowed);
        assert_eq!(r.shadowed(), vec![Mechanism::Function, Mechanism::Builtin]);
    }

    #[test]
    fn test_function_beats_builtin_outside_posix_mode() {
        let state = ShellState::bash().with_function("eval", "f.sh", 3);
        let r = run("eval", &state);
        assert_eq!(r.winner, Mechanism::Function);
        assert!(r.builtin.shadowed);
        assert_eq!(
            r.function.source,
            Some(FunctionSource {
                file: "f.sh".into(),
                line: 3
            })
        );
    }

    #[test]
    fn test_posix_special_builtin_beats_function_and_alias() {
        let state = ShellState::bash()
            .posix(true)
            .with_function("eval", "f.sh", 3)
            .with_alias("eval", "echo");
        let r = run("eval", &state);
        assert_eq!(r.winner, Mechanism::Builtin);
        assert!(r.function.shadowed);
        assert!(r.alias.shadowed);
        assert!(!r.builtin.shadowed);
    }

    #[test]
    fn test_posix_mode_with_disabled_special_builtin_falls_through() {
        let state = ShellState::bash()
            .posix(true)
            .with_builtin("eval", false)
            .with_function("eval", "f.sh", 3);
        let r = run("eval", &state);
        assert_eq!(r.winner, Mechanism::Function);
        assert_eq!(r.builtin.enabled, Some(false));
        assert!(!r.builtin.shadowed);
    }

    #[test]
    fn test_posix_special_builtin_that_is_also_keyword() {
        let state = ShellState::bash()
            .posix(true)
            .with_keyword("exec");
        let r = run("exec", &state);
        assert_eq!(r.winner, Mechanism::Builtin);
        assert!(r.keyword.found);
        assert!(r.keyword.shadowed);
    }

    #[test]
    fn test_disabled_builtin_is_not_shadowed() {
        let r = run("fg", &ShellState::bash().with_builtin("fg", false));
        assert_eq!(r.winner, Mechanism::NotFound);
        assert!(r.builtin.found);
        assert!(!r.builtin.shadowed);
        assert_eq!(r.builtin.enabled, Some(false));
    }

    #[test]
    fn test_not_found() {
        let r = run("definitely-not-a-command", &ShellState::bash());
        assert_eq!(r.winner, Mechanism::NotFound);
        assert!(!r.is_found());
        assert!(r.shadowed().is_empty());
        assert_eq!(r.path, PathStatus::default());
    }

    #[test]
    fn test_mechanism_display_matches_serde() {
        for m in Mechanism::ALL {
            let json = serde_json::to_string(&m).unwrap();
            assert_eq!(json, format!("\"{m}\""));
        }
    }
}
