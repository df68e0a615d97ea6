//! Text and JSON output for reports.

use std::fmt::Write;

use console::style;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Panel, Style},
};
use whence_resolve::{EntryState, KernelInfo, Mechanism, PathEntry, Report, Resolution};

#[derive(Debug, Serialize)]
pub struct Output<'a> {
    pub widened: bool,
    pub reports: &'a [Report],
}

pub fn json(widened: bool, reports: &[Report]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Output { widened, reports })
}

#[derive(Debug, Clone, Default)]
struct Formatter {
    header: Option<String>,
}

impl Formatter {
    fn header(title: impl Into<String>) -> Self {
        Self {
            header: Some(title.into()),
        }
    }

    fn build<T: Tabled, I: IntoIterator<Item = T>>(self, data: I) -> Table {
        let mut table = Table::new(data);
        if let Some(header) = self.header {
            table.with(Panel::header(header));
        }
        table.with(Style::blank());
        table
    }
}

#[derive(Tabled)]
struct MechanismRow {
    mechanism: &'static str,
    status:    &'static str,
    detail:    String,
}

#[derive(Tabled)]
struct PathRow {
    #[tabled(rename = "#")]
    index: usize,
    dir:   String,
    entry: &'static str,
    note:  String,
}

fn status(winner: bool, found: bool, shadowed: bool) -> &'static str {
    match (winner, found, shadowed) {
        (true, ..) => "winner",
        (_, _, true) => "shadowed",
        (_, true, _) => "found",
        _ => "-",
    }
}

fn mechanism_rows(res: &Resolution) -> Vec<MechanismRow> {
    let win = |m: Mechanism| res.winner == m;
    let function_detail = res
        .function
        .source
        .as_ref()
        .map(|s| format!("{}:{}", s.file, s.line))
        .unwrap_or_default();
    let builtin_status = match res.builtin.enabled {
        Some(false) => "disabled",
        _ => status(win(Mechanism::Builtin), res.builtin.found, res.builtin.shadowed),
    };

    vec![
        MechanismRow {
            mechanism: "alias",
            status:    status(win(Mechanism::Alias), res.alias.found, res.alias.shadowed),
            detail:    res.alias.definition.clone().unwrap_or_default(),
        },
        MechanismRow {
            mechanism: "function",
            status:    status(
                win(Mechanism::Function),
                res.function.found,
                res.function.shadowed,
            ),
            detail:    function_detail,
        },
        MechanismRow {
            mechanism: "keyword",
            status:    status(win(Mechanism::Keyword), res.keyword.found, res.keyword.shadowed),
            detail:    if res.keyword.syntax_token { "syntax token".into() } else { String::new() },
        },
        MechanismRow {
            mechanism: "builtin",
            status:    builtin_status,
            detail:    if res.builtin.special { "special".into() } else { String::new() },
        },
        MechanismRow {
            mechanism: "path",
            status:    status(win(Mechanism::Path), res.path.found, res.path.shadowed),
            detail:    res
                .path
                .resolved
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        },
    ]
}

fn path_rows(entries: &[PathEntry]) -> Vec<PathRow> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut notes = Vec::new();
            if let Some(target) = &e.symlink_target {
                notes.push(format!("-> {target}"));
            }
            if e.shadowed {
                notes.push("shadowed".to_string());
            }
            if e.usr_merged {
                notes.push("usr-merged".to_string());
            }
            PathRow {
                index: i + 1,
                dir:   e.dir.display().to_string(),
                entry: match e.state {
                    EntryState::NotFound => "-",
                    EntryState::File => "file",
                    EntryState::Symlink => "symlink",
                },
                note:  notes.join(", "),
            }
        })
        .collect()
}

fn winner_line(res: &Resolution) -> String {
    let name = style(&res.command).bold();
    match res.winner {
        Mechanism::NotFound => format!("{name}: {}", style("not found").red()),
        Mechanism::Path => format!(
            "{name}: {} {}",
            style("path").green(),
            res.path.resolved.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
        ),
        Mechanism::Alias => format!(
            "{name}: {} {}",
            style("alias").green(),
            res.alias.definition.as_deref().unwrap_or_default()
        ),
        other => format!("{name}: {}", style(other).green()),
    }
}

fn kernel_block(out: &mut String, kernel: &KernelInfo) {
    let label = |s: &'static str| style(s).dim();
    if let Some(canonical) = &kernel.canonical_path {
        let _ = writeln!(out, "  {} {}", label("canonical:"), canonical.display());
    }
    for hop in &kernel.symlink_chain {
        let _ = writeln!(
            out,
            "  {} {} -> {}",
            label("link:"),
            hop.source.display(),
            hop.target.display()
        );
    }
    if kernel.cycle_detected {
        let _ = writeln!(out, "  {}", style("symlink cycle detected").yellow());
    }
    if let Some(alt) = &kernel.alternatives {
        let _ = writeln!(
            out,
            "  {} {} selects {}",
            label("alternatives:"),
            alt.link.display(),
            alt.target.display()
        );
    }
    if let Some(interp) = &kernel.elf_interpreter {
        let _ = writeln!(out, "  {} {interp}", label("interpreter:"));
    }
    if let Some(shebang) = &kernel.shebang {
        let _ = writeln!(out, "  {} #!{shebang}", label("shebang:"));
    }
}

/// Human-readable block for one report.
pub fn text(report: &Report) -> String {
    let res = &report.resolution;
    let mut out = String::new();
    let _ = writeln!(out, "{}", winner_line(res));
    let _ = writeln!(out, "{}", Formatter::default().build(mechanism_rows(res)));
    if !report.path_entries.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            Formatter::header("PATH").build(path_rows(&report.path_entries))
        );
    }
    if let Some(kernel) = &report.kernel {
        kernel_block(&mut out, kernel);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::{PermissionsExt, symlink};
    use whence_resolve::{Inspector, ShellState};

    fn plain() { console::set_colors_enabled(false); }

    #[test]
    fn test_alias_text() {
        plain();
        let state = ShellState::bash().with_alias("ll", "ls -l");
        let report = Inspector::new().inspect("ll", &state, &[]).unwrap();
        let out = text(&report);
        assert!(out.starts_with("ll: alias ls -l"));
        assert!(out.contains("winner"));
        assert!(!out.contains("PATH"));
    }

    #[test]
    fn test_path_text_with_shadowed_entry() {
        plain();
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for dir in [first.path(), second.path()] {
            let tool = dir.join("tool");
            fs::write(&tool, "#!/bin/sh -e\n").unwrap();
            fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        }
        symlink(first.path().join("tool"), first.path().join("tool-link")).unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let report = Inspector::new()
            .inspect("tool", &ShellState::bash(), &dirs)
            .unwrap();
        let out = text(&report);
        assert!(out.contains("PATH"));
        assert!(out.contains("shadowed"));
        assert!(out.contains("shebang: #!/bin/sh -e"));

        let report = Inspector::new()
            .inspect("tool-link", &ShellState::bash(), &dirs)
            .unwrap();
        let out = text(&report);
        assert!(out.contains("symlink"));
        assert!(out.contains("link:"));
    }

    #[test]
    fn test_disabled_builtin_text() {
        plain();
        let state = ShellState::bash_fixed().with_builtin("echo", false);
        let report = Inspector::new().inspect("echo", &state, &[]).unwrap();
        let out = text(&report);
        assert!(out.starts_with("echo: not found"));
        assert!(out.contains("disabled"));
    }

    #[test]
    fn test_json_shape() {
        let state = ShellState::bash();
        let report = Inspector::new().inspect("cd", &state, &[]).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&json(true, &[report]).unwrap()).unwrap();
        assert_eq!(value["widened"], true);
        assert_eq!(value["reports"][0]["command"], "cd");
        assert_eq!(value["reports"][0]["winner"], "builtin");
        assert!(value["reports"][0]["kernel"].is_null());
    }
}
