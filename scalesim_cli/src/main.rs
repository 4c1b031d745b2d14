//! Binary entry point: config loading, logging setup, and command dispatch.

mod cli;
mod error_fmt;
mod run;

use std::fs;
use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use scalesim_config::Config;

fn main() {
    if let Err(err) = real_main() {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main() -> Result<()> {
    let cli = Cli::parse();
    color_eyre::install()?;
    let _ = JSON_MODE.set(cli.json);

    let (cfg, from_file) = load_config(&cli.config)?;
    init_logging(&cli, &cfg);
    if !from_file {
        debug!(path = %cli.config.display(), "config file not found; using defaults");
    }

    match cli.cmd {
        Commands::Run {
            port,
            baud,
            profile,
            seed,
        } => run::run(&cfg, port, baud, profile, seed),
        Commands::ListPorts => run::list_ports(),
    }
}

/// Load and validate the config TOML; a missing file falls back to defaults.
fn load_config(path: &Path) -> Result<(Config, bool)> {
    if !path.exists() {
        return Ok((Config::default(), false));
    }
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let cfg = scalesim_config::load_toml(&text)
        .wrap_err_with(|| format!("parsing config {}", path.display()))?;
    cfg.validate()?;
    Ok((cfg, true))
}

/// Install the tracing subscriber. Console logs go to stderr so the wire
/// banner and goal prompt own stdout; an optional rolling file gets the same
/// events, as JSON lines when --json is set.
fn init_logging(cli: &Cli, cfg: &Config) {
    let level = cfg
        .logging
        .level
        .clone()
        .unwrap_or_else(|| cli.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    match &cfg.logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("scalesim.log"));
            let appender = match cfg.logging.rotation.as_deref() {
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            if cli.json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(writer)
                            .with_ansi(false),
                    )
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(writer)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        None => {
            if cli.json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_target(false)
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
        }
    }
}
