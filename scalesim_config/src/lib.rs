#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the scale emulator.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every field is optional with defaults; command-line flags and the
//!   interactive menus take precedence over config values.
use serde::Deserialize;

/// Baud rates offered by the interactive menu and accepted from config/flags.
pub const BAUD_RATES: [u32; 6] = [4800, 9600, 19_200, 38_400, 57_600, 115_200];

/// Menu default (index of 9600 in `BAUD_RATES`).
pub const DEFAULT_BAUD_INDEX: usize = 1;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SerialCfg {
    /// Serial device path, e.g. "/dev/ttyUSB0" or "COM3". Also accepts alias "device".
    #[serde(alias = "device")]
    pub port: Option<String>,
    /// Line speed; must be one of `BAUD_RATES`.
    pub baud: Option<u32>,
}

/// Which scale model's wire protocol to emulate.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    /// Gross/net/tare line every 30 ms, with a handshake frame at startup.
    #[default]
    GrossNet,
    /// Single zero-padded field once per second.
    SingleField,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProfileCfg {
    pub kind: ProfileKind,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialCfg,
    pub profile: ProfileCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Serial
        if let Some(port) = &self.serial.port
            && port.trim().is_empty()
        {
            eyre::bail!("serial.port must not be empty");
        }
        if let Some(baud) = self.serial.baud
            && !BAUD_RATES.contains(&baud)
        {
            eyre::bail!(
                "serial.baud must be one of {}",
                BAUD_RATES.map(|b| b.to_string()).join("|")
            );
        }

        // Logging
        if let Some(level) = &self.logging.level {
            let known = ["error", "warn", "info", "debug", "trace"];
            if !known.contains(&level.as_str()) {
                eyre::bail!("logging.level must be one of {}", known.join("|"));
            }
        }
        if let Some(rotation) = &self.logging.rotation {
            let known = ["never", "daily", "hourly"];
            if !known.contains(&rotation.as_str()) {
                eyre::bail!("logging.rotation must be one of {}", known.join("|"));
            }
        }

        Ok(())
    }
}
