#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core scale-emulation logic (transport-agnostic).
//!
//! This crate produces the byte-for-byte serial output of two weighing
//! indicator models. All transport interactions go through the
//! `scalesim_traits::LineSink` trait.
//!
//! ## Architecture
//!
//! - **Weight**: Fixed-point weight values (`weight` module)
//! - **Planning**: Randomized settling sequences from goal to goal
//!   (`StepPlanner`)
//! - **Profiles**: Per-model cadence, framing, and tokens (`ScaleProfile`)
//! - **Transmission**: Fixed-cadence tick thread owning the sink
//!   (`Transmitter`)
//!
//! ## Fixed-Point Arithmetic
//!
//! Internals operate in **tenths of a kilogram** using `i32` for
//! deterministic behavior. See `quantize_to_tenths_i32` for the rounding at
//! the float boundary.

pub mod error;
pub mod mocks;
pub mod planner;
pub mod profile;
pub mod transmitter;
pub mod weight;

pub use error::{Result, TxError};
pub use planner::{Jitter, PlannerCfg, RandJitter, StepPlanner, StepSequence};
pub use profile::ScaleProfile;
pub use transmitter::Transmitter;
pub use weight::Weight;
