//! Closed-loop controllers driving each task to success through the public API.

use manip::reward::RewardOutput;
use manip::{tasks, ManipEnv, Transition};
use physics::{Vec3, Workbench};

const SCALE: f64 = 0.01;

fn toward(from: Vec3, to: Vec3, grip: f64) -> [f64; 4] {
    let err = (to - from) / SCALE;
    [err.x.clamp(-1.0, 1.0), err.y.clamp(-1.0, 1.0), err.z.clamp(-1.0, 1.0), grip]
}

/// Line the fingertip up in front of the button face, then push through to
/// just past the end of travel.
fn press(env: &mut ManipEnv<Workbench>) -> Vec<Transition> {
    env.reset().unwrap();
    let goal = env.episode().unwrap().state_goal;
    let mut traj = Vec::new();
    for _ in 0..env.max_path_length() {
        let face = env.observe_dict().unwrap().state_achieved_goal;
        let finger = env.finger_pos();
        let lateral = (finger.x - face.x).hypot(finger.z - face.z);
        let y = if lateral > 0.01 { face.y - 0.03 } else { goal.y + 0.01 };
        let action = toward(finger, Vec3::new(face.x, y, face.z), -1.0);
        let t = env.step(&action).unwrap();
        if let Some(marker) = t.marker {
            env.apply_marker(marker);
        }
        traj.push(t);
    }
    traj
}

/// Reach the peg end with an open gripper, close on it, then pull it out
/// along +x to the goal.
fn unplug(env: &mut ManipEnv<Workbench>) -> Vec<(Transition, RewardOutput)> {
    env.reset().unwrap();
    let goal = env.episode().unwrap().state_goal;
    let mut closing = 0;
    let mut traj = Vec::new();
    for _ in 0..env.max_path_length() {
        let finger = env.finger_pos();
        let peg_end = env.observe_dict().unwrap().state_achieved_goal;
        let action = if closing >= 4 {
            toward(finger, Vec3::new(goal.x, peg_end.y, peg_end.z), 1.0)
        } else if closing > 0 || finger.distance(peg_end) < 0.005 {
            closing += 1;
            [0.0, 0.0, 0.0, 1.0]
        } else {
            toward(finger, peg_end, -1.0)
        };
        let t = env.step(&action).unwrap();
        traj.push((t, *env.last_reward().unwrap()));
    }
    traj
}

fn assert_success_matches_threshold<'a>(traj: impl IntoIterator<Item = &'a Transition>, threshold: f64) {
    for t in traj {
        let expected = if t.info.goal_dist <= threshold { 1.0 } else { 0.0 };
        assert_eq!(t.info.success, expected, "goal_dist={}", t.info.goal_dist);
        assert!(!t.done);
    }
}

#[test]
fn button_press_succeeds_from_random_placements() {
    let mut env = tasks::make(tasks::BUTTON_PRESS, 17).unwrap();
    for _ in 0..5 {
        let traj = press(&mut env);
        assert_success_matches_threshold(&traj, 0.02);
        let last = traj.last().unwrap();
        assert_eq!(last.info.success, 1.0, "goal_dist={}", last.info.goal_dist);
        assert!(last.reward > 0.0);
    }
}

#[test]
fn pressing_raises_reward() {
    let mut env = tasks::make(tasks::BUTTON_PRESS, 4).unwrap();
    env.set_random_init(false);
    let traj = press(&mut env);
    assert!(traj[0].reward < 0.0);
    let target = env.episode().unwrap().target_reward();
    let last = traj.last().unwrap().reward;
    assert!(last > 0.5 * target, "reward {last} of {target}");
}

#[test]
fn coffee_button_succeeds() {
    let mut env = tasks::make(tasks::COFFEE_BUTTON, 0).unwrap();
    let traj = press(&mut env);
    assert_success_matches_threshold(&traj, 0.02);
    assert_eq!(traj.last().unwrap().info.success, 1.0);
    assert!(traj.iter().all(|t| t.marker.is_some()));
}

#[test]
fn peg_unplug_succeeds() {
    let mut env = tasks::make(tasks::PEG_UNPLUG_SIDE, 0).unwrap();
    let traj = unplug(&mut env);
    assert_success_matches_threshold(traj.iter().map(|(t, _)| t), 0.07);
    let (last, _) = traj.last().unwrap();
    assert_eq!(last.info.success, 1.0, "goal_dist={}", last.info.goal_dist);
    assert!(env.episode().unwrap().reach_completed);
    assert!(env.sim().is_grasping());
}

#[test]
fn peg_unplug_succeeds_from_random_placements() {
    let mut env = tasks::make(tasks::PEG_UNPLUG_SIDE, 23).unwrap();
    env.set_random_init(true);
    for _ in 0..3 {
        let traj = unplug(&mut env);
        assert_eq!(traj.last().unwrap().0.info.success, 1.0);
    }
}

#[test]
fn latched_gate_stays_open_once_reached() {
    let mut env = tasks::make(tasks::PEG_UNPLUG_SIDE, 0).unwrap();
    let traj = unplug(&mut env);
    let opened = traj.iter().position(|(_, r)| r.reach_dist < 0.05).unwrap();
    assert!(traj[..opened].iter().all(|(_, r)| !r.gate_open && r.progress_rew == 0.0));
    for (_, r) in &traj[opened..] {
        assert!(r.gate_open);
        assert!(r.progress_rew >= 0.0);
        assert!(r.pick_rew.is_none());
    }
}
