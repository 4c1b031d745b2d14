#![no_main]
use libfuzzer_sys::fuzz_target;
use scalesim_core::{PlannerCfg, RandJitter, StepPlanner, Weight};

fuzz_target!(|input: (f32, f32, u8, u64)| {
    let (goal_kg, current_kg, damping, seed) = input;
    // Quantization accepts any float, including NaN and the infinities, and
    // planning must never panic on what it produces.
    let goal = Weight::from_kg(goal_kg);
    let current = Weight::from_kg(current_kg);
    let cfg = PlannerCfg {
        damping_pct: u32::from(damping),
        step_cap: 25,
    };
    let mut planner = StepPlanner::new(cfg, RandJitter::seeded(seed));
    let steps = planner.plan(goal, current);
    // Every plan ends by reporting a goal, so it is never empty.
    assert!(!steps.is_empty());
});
