use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use whence_platform::config::{ColorChoice, Config};
use whence_platform::path::SearchPath;
use whence_platform::shell::{self, Shell};
use whence_platform::state::{DefaultSource, DumpSource, FallbackSource, SpawnSource, StateSource};
use whence_resolve::{Inspector, Report, validate_command};

use crate::cli::{App, Commands, InspectArgs};

mod cli;
mod render;

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let app = App::parse();
    init_tracing(app.verbose);

    match run(app) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("whence: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(app: App) -> Result<ExitCode> {
    if app.cmd.is_some() && !app.inspect.names.is_empty() {
        anyhow::bail!(
            "command names cannot be combined with a subcommand (use `whence -- NAME` for a command named like one)"
        );
    }
    match app.cmd {
        Some(Commands::Init { shell }) => {
            let shell: Shell = shell.parse()?;
            print!("{}", shell::init_script(shell)?);
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = App::command();
            clap_complete::generate(shell, &mut cmd, "whence", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        None => inspect(app.inspect),
    }
}

fn state_source(args: &InspectArgs, config: &Config) -> Box<dyn StateSource> {
    let defaults = DefaultSource::new().posix(args.posix);
    if let Some(path) = &args.state {
        if path.as_os_str() == "-" {
            return Box::new(DumpSource::stdin());
        }
        return Box::new(DumpSource::new(path));
    }
    if args.no_shell {
        return Box::new(defaults);
    }
    match shell::detect() {
        Some(Shell::Bash) | None => {}
        Some(other) => tracing::warn!(
            shell = %other,
            "invoked from a non-bash shell; describing a fresh bash session"
        ),
    }
    Box::new(FallbackSource::new(
        SpawnSource::new(config.bash.clone()).posix(args.posix),
        defaults,
    ))
}

fn inspect(args: InspectArgs) -> Result<ExitCode> {
    for name in &args.names {
        validate_command(name)?;
    }

    let config = Config::load().context("failed to load configuration")?;
    match args.color.unwrap_or(config.color) {
        ColorChoice::Always => console::set_colors_enabled(true),
        ColorChoice::Never => console::set_colors_enabled(false),
        ColorChoice::Auto => {}
    }

    let mut state = state_source(&args, &config)
        .load()
        .context("failed to load shell state")?;
    if args.posix {
        state = state.posix(true);
    }

    let policy = args.widen_policy(config.widen);
    let base = SearchPath::from_env();
    let inspector = Inspector::new().alternatives_dirs(config.alternatives_dirs.clone());

    let mut widened = false;
    let mut reports: Vec<Report> = Vec::with_capacity(args.names.len());
    for name in &args.names {
        let (search_path, did_widen) = base.widen_for(name, &config.admin_dirs, policy);
        widened |= did_widen;
        reports.push(inspector.inspect(name, &state, search_path.dirs())?);
    }

    let mut stdout = io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", render::json(widened, &reports)?)?;
    } else {
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                writeln!(stdout)?;
            }
            write!(stdout, "{}", render::text(report))?;
        }
        if widened {
            writeln!(stdout, "{}", console::style("(search path widened with administrative directories)").dim())?;
        }
    }

    let all_found = reports.iter().all(|r| r.resolution.is_found());
    Ok(if all_found { ExitCode::SUCCESS } else { ExitCode::from(1) })
}
