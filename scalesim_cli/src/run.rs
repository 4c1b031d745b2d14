//! Emulator session wiring: profile/port/baud resolution, the transmit
//! thread, and the operator input loop.

use std::io::{BufRead, Write as _};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dialoguer::{Select, theme::ColorfulTheme};
use eyre::WrapErr;
use tracing::{debug, info};

use crate::cli::ProfileArg;
use scalesim_config::{BAUD_RATES, Config, DEFAULT_BAUD_INDEX, ProfileKind};
use scalesim_core::error::Result as CoreResult;
use scalesim_core::{RandJitter, ScaleProfile, StepPlanner, Transmitter, Weight};
use scalesim_serial::{PortInfo, SerialSink, detected_ports, error::SerialError};
use scalesim_traits::MonotonicClock;

/// Start a transmit session: open the port, spawn the tick thread, and feed
/// it goals typed on stdin until Ctrl+C or end of input.
pub fn run(
    cfg: &Config,
    port_flag: Option<String>,
    baud_flag: Option<u32>,
    profile_flag: Option<ProfileArg>,
    seed: Option<u64>,
) -> CoreResult<()> {
    let profile = resolve_profile(profile_flag, cfg);
    let port = resolve_port(port_flag, cfg)?;
    let baud = resolve_baud(baud_flag, cfg)?;

    let sink = SerialSink::open(&port, baud, profile.asserts_control_lines())?;
    info!(port = %port, baud, profile = ?profile, "serial port opened");

    let tx = Transmitter::spawn(sink, profile, MonotonicClock::new());

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        let cancel = tx.cancel_token();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
            cancel.store(true, Ordering::Relaxed);
        })
        .wrap_err("failed to install Ctrl-C handler")?;
    }

    println!("Connected to {port} @ {baud} baud. Press Ctrl+C to stop.");

    let planner = match seed {
        Some(s) => StepPlanner::new(profile.planner_cfg(), RandJitter::seeded(s)),
        None => StepPlanner::new(profile.planner_cfg(), RandJitter::from_entropy()),
    };
    input_loop(&tx, planner, &shutdown, std::io::stdin().lock().lines())?;

    tx.stop()?;
    println!("Transmission stopped.");
    Ok(())
}

/// Print the ports visible to the process, one per line.
pub fn list_ports() -> CoreResult<()> {
    let ports = detected_ports()?;
    if ports.is_empty() {
        println!("No serial ports detected.");
        return Ok(());
    }
    for p in &ports {
        println!("{}", port_label(p));
    }
    Ok(())
}

fn port_label(p: &PortInfo) -> String {
    if p.detail.is_empty() {
        p.name.clone()
    } else {
        format!("{}  [{}]", p.name, p.detail)
    }
}

fn resolve_profile(flag: Option<ProfileArg>, cfg: &Config) -> ScaleProfile {
    match flag {
        Some(p) => p.into(),
        None => match cfg.profile.kind {
            ProfileKind::GrossNet => ScaleProfile::GrossNet,
            ProfileKind::SingleField => ScaleProfile::SingleField,
        },
    }
}

/// CLI flag, then config, then an interactive picker over detected ports.
fn resolve_port(flag: Option<String>, cfg: &Config) -> CoreResult<String> {
    if let Some(p) = flag {
        return Ok(p);
    }
    if let Some(p) = &cfg.serial.port {
        return Ok(p.clone());
    }
    let ports = detected_ports()?;
    if ports.is_empty() {
        return Err(SerialError::NoPorts.into());
    }
    let labels: Vec<String> = ports.iter().map(port_label).collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select serial port")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(|e| eyre::eyre!("port selection aborted: {e}"))?;
    Ok(ports[idx].name.clone())
}

/// CLI flag (validated), then config (already validated), then a picker.
fn resolve_baud(flag: Option<u32>, cfg: &Config) -> CoreResult<u32> {
    if let Some(b) = flag {
        if !BAUD_RATES.contains(&b) {
            eyre::bail!(
                "baud must be one of {}",
                BAUD_RATES.map(|r| r.to_string()).join("|")
            );
        }
        return Ok(b);
    }
    if let Some(b) = cfg.serial.baud {
        return Ok(b);
    }
    let labels: Vec<String> = BAUD_RATES.iter().map(ToString::to_string).collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select baud rate")
        .items(&labels)
        .default(DEFAULT_BAUD_INDEX)
        .interact()
        .map_err(|e| eyre::eyre!("baud selection aborted: {e}"))?;
    Ok(BAUD_RATES[idx])
}

/// Read goals one line at a time until shutdown or end of input.
///
/// A parseable finite number becomes a planned ramp; anything else asserts
/// the overload token until the next good goal arrives. End of input ends
/// the session cleanly and leaves the overload latch alone.
fn input_loop(
    tx: &Transmitter,
    mut planner: StepPlanner<RandJitter>,
    shutdown: &AtomicBool,
    mut lines: impl Iterator<Item = std::io::Result<String>>,
) -> CoreResult<()> {
    loop {
        if shutdown.load(Ordering::Relaxed) || !tx.is_running() {
            return Ok(());
        }
        print!("Next weight goal (blank/non-numeric shows overload): ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            debug!("input closed; leaving input loop");
            return Ok(());
        };
        let line = line.wrap_err("reading operator input")?;
        if shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
        match parse_goal(&line) {
            Some(goal) => {
                let steps = planner.plan(goal, tx.last_sent());
                tx.enqueue(&steps);
                tx.clear_overload();
                debug!(goal = %goal, steps = steps.len(), "ramp planned");
            }
            None => {
                tx.set_overload();
                debug!(input = %line.trim(), "unparseable goal; overload asserted");
            }
        }
    }
}

fn parse_goal(line: &str) -> Option<Weight> {
    line.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Weight::from_kg)
}
