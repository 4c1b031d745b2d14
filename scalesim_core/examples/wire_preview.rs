//! Wire Preview Example
//!
//! Plans a loading ramp and renders the exact serial frames a receiver would
//! see, without opening a real port.

use scalesim_core::mocks::MemorySink;
use scalesim_core::{RandJitter, ScaleProfile, StepPlanner, Transmitter, Weight};
use scalesim_traits::MonotonicClock;
use std::time::Duration;

/// Streams a 0 kg -> 12.5 kg ramp through the gross/net profile into an
/// in-memory sink and prints every frame up to the goal.
///
/// # Usage
///
/// Run with `cargo run --example wire_preview`. The ramp plays out at the
/// real 30 ms cadence, so the preview finishes in under a second.
///
/// # Errors
///
/// Returns an error if the transmit thread reports a fault, surfaced as an
/// `eyre::Report`.
fn main() -> Result<(), eyre::Report> {
    let sink = MemorySink::new();
    let record = sink.clone();

    let profile = ScaleProfile::GrossNet;
    let tx = Transmitter::spawn(sink, profile, MonotonicClock::new());

    // Seeded jitter so the preview is reproducible run to run
    let mut planner = StepPlanner::new(profile.planner_cfg(), RandJitter::seeded(7));
    let steps = planner.plan(Weight::from_kg(12.5), tx.last_sent());
    tx.enqueue(&steps);

    // Once the goal frame is on the wire, every later frame repeats it.
    let goal_mark = "0012,5";
    while !record.lines().last().is_some_and(|l| l.contains(goal_mark)) {
        std::thread::sleep(Duration::from_millis(5));
    }
    tx.stop()?;

    for line in record.lines() {
        println!("{line}");
        if line.contains(goal_mark) {
            break;
        }
    }
    Ok(())
}
