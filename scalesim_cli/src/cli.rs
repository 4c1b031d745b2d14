//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use scalesim_core::ScaleProfile;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "scalesim",
    version,
    about = "Weighing-scale serial output emulator"
)]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/scalesim.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Indicator model selectable from the command line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProfileArg {
    /// Gross/net/tare line every 30 ms, "SOBRE" on overload
    GrossNet,
    /// Single padded field every second, "E61EE" on overload
    SingleField,
}

impl From<ProfileArg> for ScaleProfile {
    fn from(p: ProfileArg) -> Self {
        match p {
            ProfileArg::GrossNet => ScaleProfile::GrossNet,
            ProfileArg::SingleField => ScaleProfile::SingleField,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream simulated weight readings over a serial port
    Run {
        /// Serial device to open (skips the interactive picker)
        #[arg(long, value_name = "PORT")]
        port: Option<String>,
        /// Baud rate; must be one of the supported rates
        #[arg(long, value_name = "BAUD")]
        baud: Option<u32>,
        /// Indicator model to emulate (takes precedence over config)
        #[arg(long, value_enum, value_name = "PROFILE")]
        profile: Option<ProfileArg>,
        /// Seed the step-count draw for reproducible ramps
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },
    /// List serial ports visible to this process
    ListPorts,
}
