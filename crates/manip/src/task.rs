//! # Task Strategies
//!
//! Task variants differ in a handful of choices: where things go at reset,
//! which site is the achieved feature, which finger point reaches for it, and
//! how distances are measured. A [`TaskSpec`] is that record of choices; the
//! shared episode, reward and randomization code reads it instead of being
//! re-implemented per task.
//!
//! Specs name simulator parts with strings. [`TaskSpec::bind`] resolves every
//! name once against a loaded model and fails on the first one missing, so a
//! bound task never looks anything up mid-episode.

use crate::config::TaskConfig;
use crate::error::TaskError;
use physics::{Axis, BodyId, JointId, SiteId, Simulator, Vec3};

/// How a task measures the distance between two points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Absolute difference along one axis.
    Axis(Axis),
    /// Euclidean norm of the x-y projection.
    Planar,
    /// Full Euclidean norm.
    Euclidean,
}

impl Metric {
    #[must_use]
    pub fn distance(self, a: Vec3, b: Vec3) -> f64 {
        match self {
            Metric::Axis(axis) => (a[axis] - b[axis]).abs(),
            Metric::Planar => a.planar_distance(b),
            Metric::Euclidean => a.distance(b),
        }
    }
}

/// Which point of the gripper is compared with the feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FingerRef {
    Left,
    Midpoint,
}

/// Reach-phase reward shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReachShaping {
    /// `-reach_dist`.
    Direct,
    /// Track laterally at home height first, then close in; reward closing
    /// the gripper once within reach.
    DescendThenTrack {
        /// Weight of the height-offset penalty while laterally far.
        height_weight: f64,
        /// Divisor applied to the positive part of the gripper action.
        close_divisor: f64,
    },
}

/// When progress shaping is allowed to contribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseGate {
    /// Re-evaluated every step from the current reach distance.
    PerStep,
    /// Latched on for the rest of the episode once reach first succeeds.
    Latched,
}

/// Which point the normalizer is measured from at reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalizerOrigin {
    /// The achieved feature site.
    Feature,
    /// The object's body centre of mass.
    ObjectCom,
}

/// Body placed at a fixed offset from the sampled anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prop {
    pub body: &'static str,
    pub offset: Vec3,
}

/// Where things go at reset and how the goal is resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Layout {
    /// A housing sits at the anchor and the button sits at a fixed offset
    /// from it (or at the default goal when randomization is off). The goal
    /// is read back from a site once the button joint is reset.
    Button {
        housing: &'static str,
        button: &'static str,
        button_joint: &'static str,
        goal_site: &'static str,
        button_offset: Vec3,
        prop: Option<Prop>,
    },
    /// A socket sits at the anchor (or the default goal when randomization
    /// is off). The object starts plugged into the socket site and the goal
    /// is the socket site shifted by `goal_offset`.
    Socket {
        socket: &'static str,
        socket_site: &'static str,
        object: &'static str,
        object_joint: &'static str,
        goal_offset: Vec3,
    },
}

/// Everything that distinguishes one task variant from another.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub config: TaskConfig,
    /// Whether resets sample placements by default.
    pub random_init: bool,
    pub layout: Layout,
    /// Site whose position is the achieved goal.
    pub feature_site: &'static str,
    pub left_finger_site: &'static str,
    pub right_finger_site: &'static str,
    /// Visual goal marker, re-applied by the caller after every step.
    pub marker_site: Option<&'static str>,
    pub finger: FingerRef,
    /// Distance used for progress shaping and success.
    pub progress: Metric,
    pub normalizer: Metric,
    pub normalizer_origin: NormalizerOrigin,
    pub reach: ReachShaping,
    pub gate: PhaseGate,
}

impl TaskSpec {
    /// Replace the static config, validating it.
    ///
    /// # Errors
    ///
    /// Any [`TaskConfig::validated`] error.
    pub fn with_config(mut self, config: TaskConfig) -> Result<Self, TaskError> {
        self.config = config.validated()?;
        Ok(self)
    }

    #[must_use]
    pub fn with_random_init(mut self, random_init: bool) -> Self {
        self.random_init = random_init;
        self
    }

    /// Resolve every simulator name the task uses.
    ///
    /// # Errors
    ///
    /// [`TaskError::MissingName`] for the first body, site or joint absent
    /// from the model.
    pub fn bind<S: Simulator>(&self, sim: &S) -> Result<Bindings, TaskError> {
        let layout = match self.layout {
            Layout::Button { housing, button, button_joint, goal_site, button_offset, prop } => {
                BoundLayout::Button {
                    housing: body(sim, housing)?,
                    button: body(sim, button)?,
                    button_joint: joint(sim, button_joint)?,
                    goal_site: site(sim, goal_site)?,
                    button_offset,
                    prop: prop.map(|p| body(sim, p.body).map(|b| (b, p.offset))).transpose()?,
                }
            }
            Layout::Socket { socket, socket_site, object, object_joint, goal_offset } => BoundLayout::Socket {
                socket: body(sim, socket)?,
                socket_site: site(sim, socket_site)?,
                object: body(sim, object)?,
                object_joint: joint(sim, object_joint)?,
                goal_offset,
            },
        };
        Ok(Bindings {
            feature: site(sim, self.feature_site)?,
            left_finger: site(sim, self.left_finger_site)?,
            right_finger: site(sim, self.right_finger_site)?,
            marker: self.marker_site.map(|m| site(sim, m)).transpose()?,
            layout,
        })
    }
}

fn body<S: Simulator>(sim: &S, name: &'static str) -> Result<BodyId, TaskError> {
    sim.body_id(name).ok_or(TaskError::MissingName { kind: "body", name })
}

fn site<S: Simulator>(sim: &S, name: &'static str) -> Result<SiteId, TaskError> {
    sim.site_id(name).ok_or(TaskError::MissingName { kind: "site", name })
}

fn joint<S: Simulator>(sim: &S, name: &'static str) -> Result<JointId, TaskError> {
    sim.joint_id(name).ok_or(TaskError::MissingName { kind: "joint", name })
}

/// [`Layout`] with every name resolved to a handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundLayout {
    Button {
        housing: BodyId,
        button: BodyId,
        button_joint: JointId,
        goal_site: SiteId,
        button_offset: Vec3,
        prop: Option<(BodyId, Vec3)>,
    },
    Socket {
        socket: BodyId,
        socket_site: SiteId,
        object: BodyId,
        object_joint: JointId,
        goal_offset: Vec3,
    },
}

/// Handles a bound task needs at reset and step time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bindings {
    pub feature: SiteId,
    pub left_finger: SiteId,
    pub right_finger: SiteId,
    pub marker: Option<SiteId>,
    pub layout: BoundLayout,
}

impl Bindings {
    /// Current position of the gripper reference point.
    #[must_use]
    pub fn finger_pos<S: Simulator>(&self, sim: &S, finger: FingerRef) -> Vec3 {
        match finger {
            FingerRef::Left => sim.site_xpos(self.left_finger),
            FingerRef::Midpoint => sim.site_xpos(self.right_finger).midpoint(sim.site_xpos(self.left_finger)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_measure_what_they_say() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.3, -0.4, 1.2);
        assert!((Metric::Axis(Axis::Y).distance(a, b) - 0.4).abs() < 1e-12);
        assert!((Metric::Planar.distance(a, b) - 0.5).abs() < 1e-12);
        assert!((Metric::Euclidean.distance(a, b) - 1.3).abs() < 1e-12);
    }
}
