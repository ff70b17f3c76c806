use manip::{tasks, TaskConfig, Transition};
use physics::{Simulator, Vec3};

const NARROW: &str = include_str!("data/narrow_button_press.json");

fn rollout(name: &str, seed: u64, random_init: bool, episodes: usize) -> Vec<Transition> {
    let mut env = tasks::make(name, seed).unwrap();
    env.set_random_init(random_init);
    let mut out = Vec::new();
    for e in 0..episodes {
        env.reset().unwrap();
        for k in 0..20 {
            let phase = (e * 20 + k) as f64 * 0.3;
            let action = [phase.sin(), phase.cos(), (2.0 * phase).sin(), (0.5 * phase).cos()];
            out.push(env.step(&action).unwrap());
        }
    }
    out
}

#[test]
fn same_seed_same_trajectory() {
    for name in tasks::NAMES {
        assert_eq!(rollout(name, 11, true, 4), rollout(name, 11, true, 4), "{name}");
    }
}

#[test]
fn different_seeds_place_differently() {
    let a = rollout(tasks::BUTTON_PRESS, 1, true, 1);
    let b = rollout(tasks::BUTTON_PRESS, 2, true, 1);
    assert_ne!(a[0].observation.feature, b[0].observation.feature);
}

#[test]
fn reseeding_replays_placements() -> anyhow::Result<()> {
    let mut env = tasks::make(tasks::PEG_UNPLUG_SIDE, 5)?;
    env.set_random_init(true);
    env.reset()?;
    let first = env.episode().unwrap().anchor;
    env.reset()?;
    assert_ne!(env.episode().unwrap().anchor, first);

    env.seed(5);
    env.reset()?;
    assert_eq!(env.episode().unwrap().anchor, first);
    Ok(())
}

#[test]
fn button_press_placements_stay_in_region() -> anyhow::Result<()> {
    let mut env = tasks::make(tasks::BUTTON_PRESS, 2024)?;
    assert!(env.random_init(), "button press randomizes by default");
    let region = env.config().obj;
    for _ in 0..10_000 {
        env.reset()?;
        let ep = *env.episode().unwrap();
        assert!(region.contains(ep.anchor), "anchor {:?}", ep.anchor);
        assert_eq!(ep.obj_init_pos, ep.anchor);

        let goal_offset = ep.state_goal - ep.anchor;
        assert!(goal_offset.distance(Vec3::new(0.0, -0.02, 0.07)) < 1e-12);
        let face = env.observe_dict()?.state_achieved_goal;
        assert!((face - ep.anchor).distance(Vec3::new(0.0, -0.12, 0.07)) < 1e-12);
        assert!((ep.max_dist - 0.1).abs() < 1e-12);
    }
    Ok(())
}

#[test]
fn coffee_button_placements_stay_in_region() -> anyhow::Result<()> {
    let mut env = tasks::make(tasks::COFFEE_BUTTON, 99)?;
    assert!(!env.random_init());
    env.set_random_init(true);
    let mug = env.sim().body_id("mug").unwrap();
    let region = env.config().obj;
    for _ in 0..2_000 {
        env.reset()?;
        let ep = *env.episode().unwrap();
        assert!(region.contains(ep.anchor));
        let mug_pos = env.sim().body_pos(mug);
        assert!((mug_pos - ep.anchor).distance(Vec3::new(0.0, -0.1, -0.28)) < 1e-12);
        assert!((ep.state_goal - ep.anchor).distance(Vec3::new(0.0, -0.02, 0.05)) < 1e-12);
        assert!((ep.max_dist - 0.1).abs() < 1e-12);
    }
    Ok(())
}

#[test]
fn peg_placements_stay_in_region() -> anyhow::Result<()> {
    let mut env = tasks::make(tasks::PEG_UNPLUG_SIDE, 3)?;
    env.set_random_init(true);
    let region = env.config().obj;
    for _ in 0..5_000 {
        env.reset()?;
        let ep = *env.episode().unwrap();
        assert!(region.contains(ep.anchor));
        let hole = ep.anchor + Vec3::new(0.044, 0.0, 0.131);
        assert!(ep.obj_init_pos.distance(hole) < 1e-12);
        assert!(ep.state_goal.distance(hole + Vec3::new(0.2, 0.0, 0.0)) < 1e-12);
        assert!((ep.max_dist - 0.2).abs() < 1e-12);
        assert!(ep.max_dist > 0.0);
    }
    Ok(())
}

#[test]
fn degenerate_region_always_yields_its_point() -> anyhow::Result<()> {
    let spec = tasks::button_press().with_config(TaskConfig::from_json(NARROW)?)?;
    let mut env = tasks::make_with(spec, 8)?;
    for _ in 0..10 {
        env.reset()?;
        assert_eq!(env.episode().unwrap().anchor, Vec3::new(0.05, 0.85, 0.05));
    }
    assert_eq!(env.max_path_length(), 40);
    Ok(())
}
