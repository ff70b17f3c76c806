//! # Reward Engine
//!
//! Phase-gated distance shaping shared by every task variant.
//!
//! The reward is the sum of two terms:
//!
//! -   **Reach term**: non-positive, pulls the gripper toward the feature
//!     site. Its exact shape is a per-task [`ReachShaping`].
//! -   **Progress term**: `1000 * (max_dist - d) + bonus(d)`, clamped at
//!     zero, where `d` is the task distance from feature to goal and
//!     `bonus` is a narrow plus a very narrow Gaussian bump. It only
//!     contributes while the phase gate is open, i.e. once the gripper has
//!     come within [`REACH_THRESHOLD`] of the feature.
//!
//! Adding the terms, rather than switching between them, keeps the reward
//! continuous when the gate opens.

use crate::task::{PhaseGate, ReachShaping, TaskSpec};
use physics::Vec3;

/// Proximity below which reaching counts as done.
pub const REACH_THRESHOLD: f64 = 0.05;
/// Bonus amplitude.
pub const C1: f64 = 1000.0;
/// Width of the wide Gaussian bump.
pub const C2: f64 = 0.01;
/// Width of the narrow Gaussian bump.
pub const C3: f64 = 0.001;
/// Slope of the linear progress term.
pub const PROGRESS_SCALE: f64 = 1000.0;

/// `C1 * (exp(-d²/C2) + exp(-d²/C3))`.
#[must_use]
pub fn gaussian_bonus(dist: f64) -> f64 {
    let d2 = dist * dist;
    C1 * ((-d2 / C2).exp() + (-d2 / C3).exp())
}

/// Progress shaping; zero while the gate is closed, never negative.
#[must_use]
pub fn progress_reward(max_dist: f64, progress_dist: f64, gate_open: bool) -> f64 {
    if !gate_open {
        return 0.0;
    }
    (PROGRESS_SCALE * (max_dist - progress_dist) + gaussian_bonus(progress_dist)).max(0.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReachTerm {
    pub reward: f64,
    /// Full Euclidean distance between finger reference and feature.
    pub dist: f64,
}

/// Reach-phase term.
///
/// For [`ReachShaping::DescendThenTrack`] the lateral band and the closing
/// bonus band overlap below the threshold; the branches are evaluated in
/// order and the reward is not continuous across the lateral boundary.
#[must_use]
pub fn reach_reward(shaping: ReachShaping, finger: Vec3, feature: Vec3, home_z: f64, grip: f64) -> ReachTerm {
    let dist = feature.distance(finger);
    let reward = match shaping {
        ReachShaping::Direct => -dist,
        ReachShaping::DescendThenTrack { height_weight, close_divisor } => {
            let lateral = feature.planar_distance(finger);
            let height = (finger.z - home_z).abs();
            let mut r = if lateral < REACH_THRESHOLD {
                -dist
            } else {
                -lateral - height_weight * height
            };
            if dist < REACH_THRESHOLD {
                r = -dist + grip.max(0.0) / close_divisor;
            }
            r
        }
    };
    ReachTerm { reward, dist }
}

/// Reduced state the engine scores.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardInputs {
    pub finger: Vec3,
    pub feature: Vec3,
    pub goal: Vec3,
    /// Gripper component of the action.
    pub grip: f64,
    /// Height of the hand's home pose.
    pub home_z: f64,
    pub max_dist: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardOutput {
    pub reward: f64,
    pub reach_rew: f64,
    pub reach_dist: f64,
    pub progress_rew: f64,
    pub progress_dist: f64,
    pub pick_rew: Option<f64>,
    pub gate_open: bool,
}

/// Score one step.
///
/// `reach_completed` records whether reaching has succeeded at any point this
/// episode and only ever goes from `false` to `true`. With
/// [`PhaseGate::Latched`] it also holds the gate open; with
/// [`PhaseGate::PerStep`] the gate follows the current distance.
pub fn compute(spec: &TaskSpec, inputs: &RewardInputs, reach_completed: &mut bool) -> RewardOutput {
    let reach = reach_reward(spec.reach, inputs.finger, inputs.feature, inputs.home_z, inputs.grip);
    let progress_dist = spec.progress.distance(inputs.feature, inputs.goal);

    let within = reach.dist < REACH_THRESHOLD;
    *reach_completed |= within;
    let gate_open = match spec.gate {
        PhaseGate::PerStep => within,
        PhaseGate::Latched => *reach_completed,
    };

    let progress_rew = progress_reward(inputs.max_dist, progress_dist, gate_open);
    debug_assert!(progress_rew >= 0.0);

    RewardOutput {
        reward: reach.reward + progress_rew,
        reach_rew: reach.reward,
        reach_dist: reach.dist,
        progress_rew,
        progress_dist,
        pick_rew: None,
        gate_open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks;

    const DESCEND: ReachShaping = ReachShaping::DescendThenTrack { height_weight: 2.0, close_divisor: 50.0 };

    #[test]
    fn bonus_peaks_at_goal() {
        assert!((gaussian_bonus(0.0) - 2000.0).abs() < 1e-9);
        assert!(gaussian_bonus(0.1) < gaussian_bonus(0.01));
        assert!(gaussian_bonus(1.0) < 1e-30);
    }

    #[test]
    fn progress_never_negative() {
        for max_i in 0..=20 {
            let max_dist = f64::from(max_i) * 0.05 + 1e-6;
            for d_i in 0..=400 {
                let d = f64::from(d_i) * 0.005;
                let r = progress_reward(max_dist, d, true);
                assert!(r >= 0.0, "max_dist={max_dist} d={d} r={r}");
            }
        }
    }

    #[test]
    fn progress_closed_gate_is_zero() {
        assert_eq!(progress_reward(0.1, 0.0, false), 0.0);
    }

    #[test]
    fn progress_at_goal_is_linear_plus_full_bonus() {
        let r = progress_reward(0.1, 0.0, true);
        assert!((r - (100.0 + 2000.0)).abs() < 1e-9);
    }

    #[test]
    fn descend_then_track_far_lateral_penalizes_height() {
        let feature = Vec3::new(0.0, 0.0, 0.1);
        let finger = Vec3::new(0.3, 0.4, 0.3);
        let t = reach_reward(DESCEND, finger, feature, 0.2, 1.0);
        assert!((t.reward - (-0.5 - 2.0 * 0.1)).abs() < 1e-12);
    }

    #[test]
    fn descend_then_track_lateral_close_uses_full_distance() {
        let feature = Vec3::new(0.0, 0.0, 0.1);
        let finger = Vec3::new(0.03, 0.0, 0.2);
        let t = reach_reward(DESCEND, finger, feature, 0.2, 1.0);
        assert!((t.reward + t.dist).abs() < 1e-12);
        assert!(t.dist >= REACH_THRESHOLD);
    }

    #[test]
    fn descend_then_track_rewards_closing_when_near() {
        let feature = Vec3::new(0.0, 0.0, 0.1);
        let finger = Vec3::new(0.0, 0.0, 0.13);
        let closing = reach_reward(DESCEND, finger, feature, 0.2, 1.0);
        assert!((closing.reward - (-0.03 + 1.0 / 50.0)).abs() < 1e-12);
        let opening = reach_reward(DESCEND, finger, feature, 0.2, -1.0);
        assert!((opening.reward + 0.03).abs() < 1e-12);
    }

    #[test]
    fn descend_then_track_jumps_at_lateral_boundary() {
        let feature = Vec3::new(0.0, 0.0, 0.0);
        let inside = reach_reward(DESCEND, Vec3::new(0.0499, 0.0, 0.1), feature, 0.2, 0.0);
        let outside = reach_reward(DESCEND, Vec3::new(0.0501, 0.0, 0.1), feature, 0.2, 0.0);
        // -dist on one side, -lateral - 2 * 0.1 on the other.
        assert!((inside.reward - outside.reward).abs() > 0.1);
    }

    fn inputs(finger: Vec3) -> RewardInputs {
        RewardInputs {
            finger,
            feature: Vec3::new(0.0, 0.78, 0.12),
            goal: Vec3::new(0.0, 0.88, 0.12),
            grip: 0.0,
            home_z: 0.2,
            max_dist: 0.1,
        }
    }

    #[test]
    fn outside_reach_only_reach_term_counts() {
        let spec = tasks::button_press();
        let mut latch = false;
        let out = compute(&spec, &inputs(Vec3::new(0.0, 0.72, 0.12)), &mut latch);
        assert!((out.reach_dist - 0.06).abs() < 1e-12);
        assert_eq!(out.progress_rew, 0.0);
        assert_eq!(out.reward, out.reach_rew);
        assert!((out.reward + 0.06).abs() < 1e-12);
        assert!((out.progress_dist - 0.1).abs() < 1e-12);
        assert!(out.pick_rew.is_none());
        assert!(!latch);
    }

    #[test]
    fn per_step_gate_closes_when_gripper_retreats() {
        let spec = tasks::button_press();
        let mut latch = false;
        let near = compute(&spec, &inputs(Vec3::new(0.0, 0.76, 0.12)), &mut latch);
        assert!(near.gate_open && near.progress_rew > 0.0);
        let far = compute(&spec, &inputs(Vec3::new(0.0, 0.6, 0.12)), &mut latch);
        assert!(!far.gate_open);
        assert_eq!(far.progress_rew, 0.0);
        assert!(latch, "history of reaching is still recorded");
    }

    #[test]
    fn latched_gate_stays_open_after_retreat() {
        let spec = tasks::peg_unplug_side();
        let mut latch = false;
        let feature = Vec3::new(-0.131, 0.6, 0.181);
        let base = RewardInputs {
            finger: feature + Vec3::new(0.0, 0.0, 0.01),
            feature,
            goal: Vec3::new(0.019, 0.6, 0.181),
            grip: 1.0,
            home_z: 0.2,
            max_dist: 0.2,
        };
        let near = compute(&spec, &base, &mut latch);
        assert!(near.gate_open);
        let far = compute(&spec, &RewardInputs { finger: feature + Vec3::new(0.0, 0.0, 0.3), ..base }, &mut latch);
        assert!(far.gate_open);
        assert!(far.progress_rew > 0.0);
        assert!(far.reach_dist > REACH_THRESHOLD);
    }
}
