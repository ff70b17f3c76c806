//! # Episode Controller
//!
//! [`ManipEnv`] owns a simulator, a bound task and the caller-seeded random
//! source, and runs the fixed-length reset/step protocol:
//!
//! ```text
//! Uninitialized --reset--> Ready --step--> Running --step--> Running ...
//!                            ^                 |
//!                            +-----reset-------+
//! ```
//!
//! `step` always reports `done = false`. Ending the episode after
//! `max_path_length` steps is the caller's job; [`ManipEnv::path_exhausted`]
//! is there to make that check easy.

use crate::config::{BoxSpace, TaskConfig, ACTION_DIM, OBS_DIM};
use crate::error::TaskError;
use crate::observation::{observe, ObsDict, Observation};
use crate::randomize;
use crate::reward::{self, RewardInputs, RewardOutput};
use crate::task::{Bindings, FingerRef, TaskSpec};
use physics::{SiteId, Simulator, Vec3};

/// Mocap orientation held for the whole episode.
pub const HAND_QUAT: [f64; 4] = [1.0, 0.0, 1.0, 0.0];
/// Open-loop settle iterations used to centre the hand at reset.
pub const HAND_RESET_ITERATIONS: usize = 10;
/// Gripper controls applied while centering: fully open.
const OPEN_CTRL: [f64; 2] = [-1.0, 1.0];

/// `1.0` when `goal_dist` is within `threshold`, inclusive, else `0.0`.
#[must_use]
pub fn success_flag(goal_dist: f64, threshold: f64) -> f64 {
    if goal_dist <= threshold {
        1.0
    } else {
        0.0
    }
}

/// Per-episode state, replaced wholesale at every reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeState {
    /// Sampled (or default) position the layout was built around.
    pub anchor: Vec3,
    pub obj_init_pos: Vec3,
    /// Effective goal, fixed for the episode.
    pub state_goal: Vec3,
    /// Shaping normalizer, fixed for the episode and strictly positive.
    pub max_dist: f64,
    /// Fingertip midpoint after the hand was centred.
    pub init_finger_com: Vec3,
    pub step_count: usize,
    /// Whether the gripper has been within reach of the feature this episode.
    pub reach_completed: bool,
}

impl EpisodeState {
    /// Nominal per-step reward ceiling: full linear progress plus both bonus peaks.
    #[must_use]
    pub fn target_reward(&self) -> f64 {
        reward::PROGRESS_SCALE * self.max_dist + 2.0 * reward::C1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Uninitialized,
    Ready,
    Running,
}

/// Diagnostics returned with every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Info {
    pub reach_dist: f64,
    pub goal_dist: f64,
    pub ep_rew: f64,
    pub pick_rew: Option<f64>,
    /// Exactly `0.0` or `1.0`.
    pub success: f64,
    /// The task's configured default goal.
    pub goal: Vec3,
}

/// Visual goal marker the caller should place after a step or reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerUpdate {
    pub site: SiteId,
    pub pos: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f64,
    /// Always `false`.
    pub done: bool,
    pub info: Info,
    pub marker: Option<MarkerUpdate>,
}

pub struct ManipEnv<S: Simulator> {
    spec: TaskSpec,
    bindings: Bindings,
    sim: S,
    rng: fastrand::Rng,
    random_init: bool,
    status: Status,
    episode: Option<EpisodeState>,
    last_reward: Option<RewardOutput>,
}

impl<S: Simulator> ManipEnv<S> {
    /// Validate the task config, resolve every simulator name the task uses
    /// and seed the random source.
    ///
    /// # Errors
    ///
    /// Config validation errors, or [`TaskError::MissingName`] when the model
    /// lacks a body, site or joint the task refers to.
    pub fn new(spec: TaskSpec, sim: S, seed: u64) -> Result<Self, TaskError> {
        let config = spec.config.validated()?;
        let spec = TaskSpec { config, ..spec };
        let bindings = spec.bind(&sim)?;
        let random_init = spec.random_init;
        Ok(Self {
            spec,
            bindings,
            sim,
            rng: fastrand::Rng::with_seed(seed),
            random_init,
            status: Status::Uninitialized,
            episode: None,
            last_reward: None,
        })
    }

    /// Reseed the random source. The next reset draws from the new seed.
    pub fn seed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    pub fn set_random_init(&mut self, enabled: bool) {
        self.random_init = enabled;
    }

    #[must_use]
    pub fn random_init(&self) -> bool {
        self.random_init
    }

    #[must_use]
    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    #[must_use]
    pub fn config(&self) -> &TaskConfig {
        &self.spec.config
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn episode(&self) -> Option<&EpisodeState> {
        self.episode.as_ref()
    }

    /// Reward breakdown of the most recent step.
    #[must_use]
    pub fn last_reward(&self) -> Option<&RewardOutput> {
        self.last_reward.as_ref()
    }

    #[must_use]
    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    #[must_use]
    pub fn action_space(&self) -> BoxSpace<ACTION_DIM> {
        TaskConfig::action_space()
    }

    #[must_use]
    pub fn observation_space(&self) -> BoxSpace<OBS_DIM> {
        self.spec.config.observation_space()
    }

    #[must_use]
    pub fn max_path_length(&self) -> usize {
        self.spec.config.max_path_length
    }

    /// Whether the caller should end the episode now.
    #[must_use]
    pub fn path_exhausted(&self) -> bool {
        self.episode
            .as_ref()
            .is_some_and(|e| e.step_count >= self.spec.config.max_path_length)
    }

    /// Current gripper reference point for this task.
    #[must_use]
    pub fn finger_pos(&self) -> Vec3 {
        self.bindings.finger_pos(&self.sim, self.spec.finger)
    }

    /// Goal-conditioned observation of the current state.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotReset`] before the first reset.
    pub fn observe_dict(&self) -> Result<ObsDict, TaskError> {
        let episode = self.episode.as_ref().ok_or(TaskError::NotReset)?;
        Ok(observe(&self.sim, self.bindings.feature, episode.state_goal))
    }

    /// Marker placement for the current goal, if the task has a marker site.
    #[must_use]
    pub fn goal_marker(&self) -> Option<MarkerUpdate> {
        let episode = self.episode.as_ref()?;
        self.bindings.marker.map(|site| MarkerUpdate { site, pos: episode.state_goal })
    }

    /// Write a marker into the simulator.
    pub fn apply_marker(&mut self, marker: MarkerUpdate) {
        self.sim.set_site_xpos(marker.site, marker.pos);
    }

    /// Centre the hand, lay out a new episode and return its first observation.
    ///
    /// # Errors
    ///
    /// Simulator errors from joint resets. The simulator state is checked
    /// before the hand or any body moves, so a failed reset leaves both the
    /// scene and the previous episode as they were.
    pub fn reset(&mut self) -> Result<Observation, TaskError> {
        let state = self.sim.state();
        self.sim.set_state(&state)?;

        self.reset_hand();
        let init_finger_com = self.bindings.finger_pos(&self.sim, FingerRef::Midpoint);

        let placement =
            randomize::sample(&self.spec, &self.bindings, &mut self.sim, &mut self.rng, self.random_init)?;

        self.episode = Some(EpisodeState {
            anchor: placement.anchor,
            obj_init_pos: placement.obj_init_pos,
            state_goal: placement.state_goal,
            max_dist: placement.max_dist,
            init_finger_com,
            step_count: 0,
            reach_completed: false,
        });
        self.last_reward = None;
        self.status = Status::Ready;

        Ok(observe(&self.sim, self.bindings.feature, placement.state_goal).state_observation)
    }

    fn reset_hand(&mut self) {
        let home = self.spec.config.default_hand_pos;
        for _ in 0..HAND_RESET_ITERATIONS {
            self.sim.set_mocap_pose(home, HAND_QUAT);
            self.sim.set_ctrl(OPEN_CTRL);
            self.sim.advance(self.spec.config.frame_skip);
        }
    }

    /// Apply `action = [dx, dy, dz, grip]` and score the result.
    ///
    /// The Cartesian part is clipped to `[-1, 1]`, scaled and added to the
    /// mocap target, which is then clipped to the hand workspace. The gripper
    /// scalar drives the fingers as `[grip, -grip]`.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotReset`] before the first reset,
    /// [`TaskError::ActionArity`] or [`TaskError::NonFiniteAction`] for a
    /// malformed action. Nothing is applied when an error is returned.
    pub fn step(&mut self, action: &[f64]) -> Result<Transition, TaskError> {
        if action.len() != ACTION_DIM {
            return Err(TaskError::ActionArity { expected: ACTION_DIM, actual: action.len() });
        }
        if let Some(index) = action.iter().position(|a| !a.is_finite()) {
            return Err(TaskError::NonFiniteAction { index });
        }
        let mut episode = self.episode.ok_or(TaskError::NotReset)?;
        let config = &self.spec.config;

        let unit = Vec3::new(1.0, 1.0, 1.0);
        let delta = Vec3::new(action[0], action[1], action[2]).clamp(-unit, unit) * config.action_scale;
        let target = config.hand.clip(self.sim.mocap_pos() + delta);
        self.sim.set_mocap_pose(target, HAND_QUAT);
        let grip = action[3];
        self.sim.set_ctrl([grip, -grip]);
        self.sim.advance(config.frame_skip);

        let obs = observe(&self.sim, self.bindings.feature, episode.state_goal);
        let inputs = RewardInputs {
            finger: self.finger_pos(),
            feature: obs.state_achieved_goal,
            goal: episode.state_goal,
            grip,
            home_z: config.default_hand_pos.z,
            max_dist: episode.max_dist,
        };
        let scored = reward::compute(&self.spec, &inputs, &mut episode.reach_completed);
        episode.step_count += 1;

        let success = success_flag(scored.progress_dist, config.success_threshold);
        let info = Info {
            reach_dist: scored.reach_dist,
            goal_dist: scored.progress_dist,
            ep_rew: scored.reward,
            pick_rew: scored.pick_rew,
            success,
            goal: config.default_goal,
        };

        tracing::trace!(
            task = self.spec.name,
            step = episode.step_count,
            reward = scored.reward,
            reach_dist = scored.reach_dist,
            goal_dist = scored.progress_dist,
            gate_open = scored.gate_open,
            "step"
        );

        self.episode = Some(episode);
        self.last_reward = Some(scored);
        self.status = Status::Running;

        Ok(Transition {
            observation: obs.state_observation,
            reward: scored.reward,
            done: false,
            info,
            marker: self.goal_marker(),
        })
    }
}
