//! Settling-curve planner.
//!
//! Given a goal and the value currently on the wire, produces the sequence of
//! intermediate readings a mechanical platform would report while settling.
//! The step count is randomized within bounds so consecutive runs do not look
//! machine-perfect; the draw goes through the `Jitter` seam so tests can
//! script exact sequences.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::weight::Weight;

/// A planned settling sequence, transmitted oldest first.
pub type StepSequence = Vec<Weight>;

/// Randomness seam for step fractioning.
///
/// `pick` returns a value in the half-open range `[lo, hi)`; the planner only
/// calls it with `lo < hi`.
pub trait Jitter {
    fn pick(&mut self, lo: u64, hi: u64) -> u64;
}

/// Production draw backed by `rand`'s standard RNG.
#[derive(Debug)]
pub struct RandJitter {
    rng: StdRng,
}

impl RandJitter {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded variant for reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Jitter for RandJitter {
    fn pick(&mut self, lo: u64, hi: u64) -> u64 {
        debug_assert!(lo < hi);
        self.rng.random_range(lo..hi)
    }
}

/// Planner tuning, owned by the wire profile.
#[derive(Debug, Clone, Copy)]
pub struct PlannerCfg {
    /// Percentage of the goal distance used when sizing step increments
    /// (100 = undamped). Lower values size increments against a shortened
    /// distance, so the walk takes more, smaller steps before snapping.
    pub damping_pct: u32,
    /// Upper bound on the fractioned step draw.
    pub step_cap: u64,
}

impl Default for PlannerCfg {
    fn default() -> Self {
        Self {
            damping_pct: 100,
            step_cap: 25,
        }
    }
}

/// Plans settling sequences. Holds the jitter source, which is why planning
/// takes `&mut self`.
#[derive(Debug)]
pub struct StepPlanner<J: Jitter> {
    cfg: PlannerCfg,
    jitter: J,
}

impl<J: Jitter> StepPlanner<J> {
    pub fn new(cfg: PlannerCfg, jitter: J) -> Self {
        Self { cfg, jitter }
    }

    /// Produce the settling sequence from `current` to `goal`.
    ///
    /// Ascending plans end exactly at `goal`. Descending plans walk down to
    /// just above `goal` and then report `current` once more; the original
    /// indicators emit this settle-back echo after unloading and downstream
    /// parsers expect it. An unchanged goal yields a single confirming step.
    pub fn plan(&mut self, goal: Weight, current: Weight) -> StepSequence {
        if goal == current {
            return vec![goal];
        }

        let descending = goal < current;
        let (lo, hi) = if descending {
            (goal.tenths(), current.tenths())
        } else {
            (current.tenths(), goal.tenths())
        };

        // span > 0 here; fits u64 even for the full i32 range.
        let span = (i64::from(hi) - i64::from(lo)) as u64;
        let total_units = damped_units(span, self.cfg.damping_pct);
        let fractioned = self.fraction(total_units);
        let increment = total_units / fractioned;
        debug_assert!(increment >= 1);

        let mut steps = StepSequence::new();
        let hi_i = i64::from(hi);
        let inc = increment as i64;
        let mut at = i64::from(lo);
        while at < hi_i {
            at += inc;
            if at + inc > hi_i {
                at = hi_i;
            }
            steps.push(Weight::from_tenths(at as i32));
        }

        if descending {
            steps.reverse();
            steps.push(current);
        }
        steps
    }

    /// Draw the fractioned step count for a plan covering `total_units`.
    ///
    /// The draw range is `[ceil(total/10), total)`; degenerate ranges take
    /// the lower bound. The result is capped and floored to stay in
    /// `[1, step_cap]`.
    fn fraction(&mut self, total_units: u64) -> u64 {
        debug_assert!(total_units >= 1);
        let lower = total_units.div_ceil(10);
        let drawn = if lower < total_units {
            self.jitter.pick(lower, total_units)
        } else {
            lower
        };
        let capped = drawn.min(self.cfg.step_cap);
        capped.max(1)
    }
}

/// Units of resolution covered by a plan after damping. Never zero for a
/// non-zero span.
fn damped_units(span: u64, damping_pct: u32) -> u64 {
    let pct = u64::from(damping_pct.clamp(1, 100));
    (span * pct).div_ceil(100)
}
