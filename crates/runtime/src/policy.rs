//! Action sources for rollouts.

use manip::{Layout, ManipEnv, TaskError};
use physics::{Vec3, Workbench};

/// Steps spent closing the gripper before pulling.
const CLOSE_STEPS: usize = 4;
/// Fingertip alignment tolerance before committing to a push or grasp.
const ALIGN_TOL: f64 = 0.005;
/// Standoff kept in front of a button face while lining up.
const STANDOFF: f64 = 0.03;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PolicyKind {
    Random,
    Scripted,
}

pub trait Policy {
    /// Called after every reset.
    fn reset(&mut self) {}

    /// # Errors
    ///
    /// Propagates environment errors.
    fn act(&mut self, env: &ManipEnv<Workbench>) -> Result<[f64; 4], TaskError>;
}

#[must_use]
pub fn build(kind: PolicyKind, seed: u64) -> Box<dyn Policy> {
    match kind {
        PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
        PolicyKind::Scripted => Box::new(ScriptedPolicy::default()),
    }
}

/// Uniform samples from the action box.
pub struct RandomPolicy {
    rng: fastrand::Rng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: fastrand::Rng::with_seed(seed) }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _env: &ManipEnv<Workbench>) -> Result<[f64; 4], TaskError> {
        Ok(std::array::from_fn(|_| 2.0 * self.rng.f64() - 1.0))
    }
}

/// Proportional controller on the task's finger reference.
///
/// Button layouts: line up in front of the face, then push to just past the
/// end of travel. Socket layouts: reach the feature open, close, then pull
/// along the goal offset.
#[derive(Default)]
pub struct ScriptedPolicy {
    closing: usize,
}

impl ScriptedPolicy {
    fn toward(scale: f64, from: Vec3, to: Vec3, grip: f64) -> [f64; 4] {
        let err = (to - from) / scale;
        [err.x.clamp(-1.0, 1.0), err.y.clamp(-1.0, 1.0), err.z.clamp(-1.0, 1.0), grip]
    }
}

impl Policy for ScriptedPolicy {
    fn reset(&mut self) {
        self.closing = 0;
    }

    fn act(&mut self, env: &ManipEnv<Workbench>) -> Result<[f64; 4], TaskError> {
        let obs = env.observe_dict()?;
        let feature = obs.state_achieved_goal;
        let goal = obs.state_desired_goal;
        let finger = env.finger_pos();
        let scale = env.config().action_scale;

        let action = match env.spec().layout {
            Layout::Button { .. } => {
                let lateral = (finger.x - feature.x).hypot(finger.z - feature.z);
                let y = if lateral > 2.0 * ALIGN_TOL { feature.y - STANDOFF } else { goal.y + 0.01 };
                Self::toward(scale, finger, Vec3::new(feature.x, y, feature.z), -1.0)
            }
            Layout::Socket { .. } => {
                if self.closing >= CLOSE_STEPS {
                    Self::toward(scale, finger, Vec3::new(goal.x, feature.y, feature.z), 1.0)
                } else if self.closing > 0 || finger.distance(feature) < ALIGN_TOL {
                    self.closing += 1;
                    [0.0, 0.0, 0.0, 1.0]
                } else {
                    Self::toward(scale, finger, feature, -1.0)
                }
            }
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manip::tasks;

    fn run(name: &str, policy: &mut dyn Policy, random_init: bool) -> f64 {
        let mut env = tasks::make(name, 1).unwrap();
        env.set_random_init(random_init);
        env.reset().unwrap();
        policy.reset();
        let mut success = 0.0;
        while !env.path_exhausted() {
            let action = policy.act(&env).unwrap();
            success = env.step(&action).unwrap().info.success;
        }
        success
    }

    #[test]
    fn scripted_solves_every_task() {
        for name in tasks::NAMES {
            for random_init in [false, true] {
                let mut policy = ScriptedPolicy::default();
                assert_eq!(run(name, &mut policy, random_init), 1.0, "{name} random_init={random_init}");
            }
        }
    }

    #[test]
    fn random_actions_stay_in_the_action_box() {
        let env = tasks::make(tasks::BUTTON_PRESS, 0).unwrap();
        let space = env.action_space();
        let mut policy = RandomPolicy::new(3);
        for _ in 0..1000 {
            assert!(space.contains(&policy.act(&env).unwrap()));
        }
    }
}
