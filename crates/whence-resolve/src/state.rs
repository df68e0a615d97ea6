//! Immutable snapshot of a shell's name tables.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Builtins that POSIX mode protects from same-named functions.
pub const POSIX_SPECIAL_BUILTINS: &[&str] = &[
    "break", ":", ".", "continue", "eval", "exec", "exit", "export", "readonly", "return", "set",
    "shift", "times", "trap", "unset",
];

/// Tokens the parser consumes before any name lookup happens.
pub const SYNTAX_TOKENS: &[&str] = &["{", "}", "(", ")", "[[", "]]", "]", "."];

/// `compgen -k` on bash 5.
pub const BASH_KEYWORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "case", "esac", "for", "select", "while", "until", "do",
    "done", "in", "function", "time", "{", "}", "!", "[[", "]]", "coproc",
];

/// `enable -a` on bash 5, all enabled by default.
pub const BASH_BUILTINS: &[&str] = &[
    ".", ":", "[", "alias", "bg", "bind", "break", "builtin", "caller", "cd", "command",
    "compgen", "complete", "compopt", "continue", "declare", "dirs", "disown", "echo", "enable",
    "eval", "exec", "exit", "export", "false", "fc", "fg", "getopts", "hash", "help", "history",
    "jobs", "kill", "let", "local", "logout", "mapfile", "popd", "printf", "pushd", "pwd", "read",
    "readarray", "readonly", "return", "set", "shift", "shopt", "source", "suspend", "test",
    "times", "trap", "true", "type", "typeset", "ulimit", "umask", "unalias", "unset", "wait",
];

/// Where a shell function was defined, as reported by `declare -F` under
/// `extdebug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSource {
    pub file: String,
    pub line: u32,
}

/// Everything the resolver needs to know about a shell session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShellState {
    pub posix_mode:       bool,
    pub special_builtins: BTreeSet<String>,
    pub aliases:          BTreeMap<String, String>,
    pub functions:        BTreeMap<String, FunctionSource>,
    /// name -> enabled
    pub builtins:         BTreeMap<String, bool>,
    pub keywords:         BTreeSet<String>,
    pub syntax_tokens:    BTreeSet<String>,
}

fn owned_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl ShellState {
    /// Bash's fixed tables only: the special-builtin and syntax-token sets.
    ///
    /// Keywords, builtins, aliases and functions are left empty for the
    /// snapshot producer to fill in.
    pub fn bash_fixed() -> Self {
        Self {
            special_builtins: owned_set(POSIX_SPECIAL_BUILTINS),
            syntax_tokens: owned_set(SYNTAX_TOKENS),
            ..Self::default()
        }
    }

    /// A fresh non-interactive bash: stock keywords and builtins, no aliases
    /// or functions, POSIX mode off.
    pub fn bash() -> Self {
        Self {
            keywords: owned_set(BASH_KEYWORDS),
            builtins: BASH_BUILTINS.iter().map(|b| (b.to_string(), true)).collect(),
            ..Self::bash_fixed()
        }
    }

    pub fn posix(mut self, on: bool) -> Self {
        self.posix_mode = on;
        self
    }

    pub fn with_alias(mut self, name: impl Into<String>, definition: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), definition.into());
        self
    }

    pub fn with_function(
        mut self,
        name: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        self.functions.insert(
            name.into(),
            FunctionSource {
                file: file.into(),
                line,
            },
        );
        self
    }

    pub fn with_builtin(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.builtins.insert(name.into(), enabled);
        self
    }

    pub fn with_keyword(mut self, name: impl Into<String>) -> Self {
        self.keywords.insert(name.into());
        self
    }

    pub fn with_special_builtin(mut self, name: impl Into<String>) -> Self {
        self.special_builtins.insert(name.into());
        self
    }

    pub fn is_special_builtin(&self, name: &str) -> bool { self.special_builtins.contains(name) }
}
