//! Exact settling sequences with scripted draws.

use rstest::rstest;
use scalesim_core::mocks::FixedJitter;
use scalesim_core::{PlannerCfg, ScaleProfile, StepPlanner, Weight};

fn kg(seq: &[Weight]) -> Vec<String> {
    seq.iter().map(ToString::to_string).collect()
}

#[test]
fn loading_zero_to_five_kg_with_ten_fractions() {
    // 5.0 kg is 50 units; a scripted draw of 10 gives 0.5 kg increments.
    let mut planner = StepPlanner::new(
        ScaleProfile::GrossNet.planner_cfg(),
        FixedJitter::new([10]),
    );
    let seq = planner.plan(Weight::from_kg(5.0), Weight::ZERO);
    assert_eq!(
        kg(&seq),
        ["0.5", "1.0", "1.5", "2.0", "2.5", "3.0", "3.5", "4.0", "4.5", "5.0"]
    );
}

#[test]
fn unloading_five_kg_descends_then_echoes_the_start() {
    let mut planner = StepPlanner::new(
        ScaleProfile::GrossNet.planner_cfg(),
        FixedJitter::new([10]),
    );
    let seq = planner.plan(Weight::ZERO, Weight::from_kg(5.0));
    assert_eq!(
        kg(&seq),
        ["5.0", "4.5", "4.0", "3.5", "3.0", "2.5", "2.0", "1.5", "1.0", "0.5", "5.0"]
    );
}

#[test]
fn single_field_damping_lands_short_steps_then_snaps() {
    // 80% damping sizes increments against 40 of the 50 units.
    let mut planner = StepPlanner::new(
        ScaleProfile::SingleField.planner_cfg(),
        FixedJitter::new([10]),
    );
    let seq = planner.plan(Weight::from_kg(5.0), Weight::ZERO);
    assert_eq!(
        kg(&seq),
        ["0.4", "0.8", "1.2", "1.6", "2.0", "2.4", "2.8", "3.2", "3.6", "4.0", "4.4", "5.0"]
    );
}

#[test]
fn negative_goals_follow_the_same_walk() {
    let mut planner = StepPlanner::new(PlannerCfg::default(), FixedJitter::new([5]));
    let seq = planner.plan(Weight::from_kg(-2.0), Weight::ZERO);
    assert_eq!(kg(&seq), ["0.0", "-0.4", "-0.8", "-1.2", "-1.6", "0.0"]);
}

#[rstest]
#[case(0.0)]
#[case(3.3)]
#[case(-1.2)]
fn unchanged_goal_confirms_once(#[case] v: f32) {
    let mut planner = StepPlanner::new(PlannerCfg::default(), FixedJitter::new([]));
    let w = Weight::from_kg(v);
    assert_eq!(planner.plan(w, w), vec![w]);
}

#[test]
fn consecutive_plans_resume_from_the_previous_goal() {
    // Session flow: 0 -> 1.0, then 1.0 -> 1.5; the second plan starts above 1.0.
    let mut planner = StepPlanner::new(
        ScaleProfile::GrossNet.planner_cfg(),
        FixedJitter::new([2, 5]),
    );
    let first = planner.plan(Weight::from_kg(1.0), Weight::ZERO);
    assert_eq!(first.last().copied(), Some(Weight::from_kg(1.0)));

    let second = planner.plan(Weight::from_kg(1.5), Weight::from_kg(1.0));
    assert!(second.iter().all(|w| *w > Weight::from_kg(1.0)));
    assert_eq!(second.last().copied(), Some(Weight::from_kg(1.5)));
}
