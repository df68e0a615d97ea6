//! Text dump of a bash session's name tables.
//!
//! [`DUMP_SCRIPT`] runs inside bash and prints sections introduced by
//! `@@name` marker lines; [`parse_dump`] turns that text back into a
//! [`ShellState`]. Anything printed before the first marker (noise from
//! rc files) is ignored, as is anything after `@@end`.

use once_cell::sync::Lazy;
use regex::Regex;
use whence_resolve::ShellState;

use crate::error::{Error, Result};

/// Bash commands that print the dump for the shell they run in.
///
/// Uses only builtins so it works with an empty `PATH`, and restores
/// `extdebug` to its previous setting.
pub const DUMP_SCRIPT: &str = r#"printf '@@posix\n'
if shopt -qo posix; then printf 'on\n'; else printf 'off\n'; fi
printf '@@aliases\n'
alias -p
printf '@@functions\n'
__whence_ext=0; shopt -q extdebug && __whence_ext=1
shopt -s extdebug
for __whence_f in $(compgen -A function); do declare -F "$__whence_f"; done
[ "$__whence_ext" = 1 ] || shopt -u extdebug
unset __whence_ext __whence_f
printf '@@builtins\n'
enable -a
printf '@@keywords\n'
compgen -k
printf '@@end\n'"#;

static FUNCTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+) (\d+) (.*)$").expect("static regex"));

static BUILTIN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^enable (-n )?(\S+)$").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Posix,
    Aliases,
    Functions,
    Builtins,
    Keywords,
    End,
}

impl Section {
    fn from_marker(marker: &str) -> Option<Self> {
        Some(match marker {
            "posix" => Self::Posix,
            "aliases" => Self::Aliases,
            "functions" => Self::Functions,
            "builtins" => Self::Builtins,
            "keywords" => Self::Keywords,
            "end" => Self::End,
            _ => return None,
        })
    }
}

/// Parses a dump produced by [`DUMP_SCRIPT`].
///
/// The special-builtin and syntax-token sets are not observable from bash
/// and come from [`ShellState::bash_fixed`].
pub fn parse_dump(text: &str) -> Result<ShellState> {
    let mut state = ShellState::bash_fixed();
    let mut section = Section::Preamble;
    let mut seen_marker = false;
    let mut pending_alias: Option<(usize, String)> = None;

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;

        if let Some((start, mut buf)) = pending_alias.take() {
            buf.push('\n');
            buf.push_str(line);
            match parse_alias(&buf) {
                Some((name, value)) => {
                    state.aliases.insert(name, value);
                }
                None => pending_alias = Some((start, buf)),
            }
            continue;
        }

        if let Some(marker) = line.strip_prefix("@@") {
            section = Section::from_marker(marker).ok_or_else(|| Error::MalformedDump {
                line:   lineno,
                reason: format!("unknown section '{marker}'"),
            })?;
            seen_marker = true;
            continue;
        }

        match section {
            Section::Preamble | Section::End => {}
            Section::Posix => match line.trim() {
                "on" => state.posix_mode = true,
                "off" => state.posix_mode = false,
                other => {
                    return Err(Error::MalformedDump {
                        line:   lineno,
                        reason: format!("expected on/off, got '{other}'"),
                    });
                }
            },
            Section::Aliases => {
                if !line.starts_with("alias ") {
                    return Err(Error::MalformedDump {
                        line:   lineno,
                        reason: "expected an alias definition".to_string(),
                    });
                }
                match parse_alias(line) {
                    Some((name, value)) => {
                        state.aliases.insert(name, value);
                    }
                    // value spans lines
                    None => pending_alias = Some((lineno, line.to_string())),
                }
            }
            Section::Functions => {
                let caps = FUNCTION_LINE
                    .captures(line)
                    .ok_or_else(|| Error::MalformedDump {
                        line:   lineno,
                        reason: "expected 'name line file'".to_string(),
                    })?;
                let line_no = caps[2].parse().unwrap_or(0);
                state = state.with_function(&caps[1], &caps[3], line_no);
            }
            Section::Builtins => {
                let caps = BUILTIN_LINE
                    .captures(line)
                    .ok_or_else(|| Error::MalformedDump {
                        line:   lineno,
                        reason: "expected 'enable [-n] name'".to_string(),
                    })?;
                state = state.with_builtin(&caps[2], caps.get(1).is_none());
            }
            Section::Keywords => {
                let word = line.trim();
                if !word.is_empty() {
                    state.keywords.insert(word.to_string());
                }
            }
        }
    }

    if let Some((start, _)) = pending_alias {
        return Err(Error::MalformedDump {
            line:   start,
            reason: "unterminated alias quoting".to_string(),
        });
    }
    if !seen_marker {
        return Err(Error::MalformedDump {
            line:   0,
            reason: "no sections found".to_string(),
        });
    }
    Ok(state)
}

/// Splits `alias name='value'` and undoes bash's quoting. Returns `None`
/// while the quoting is still open.
fn parse_alias(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("alias ")?;
    let rest = rest.strip_prefix("-- ").unwrap_or(rest);
    let (name, quoted) = rest.split_once('=')?;
    Some((name.to_string(), unquote(quoted)?))
}

/// Undoes POSIX shell quoting of one word: `'...'`, `\x` and bare text.
fn unquote(word: &str) -> Option<String> {
    let mut out = String::with_capacity(word.len());
    let mut chars = word.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' => loop {
                match chars.next()? {
                    '\'' => break,
                    inner => out.push(inner),
                }
            },
            '\\' => out.push(chars.next()?),
            other => out.push(other),
        }
    }
    Some(out)
}
