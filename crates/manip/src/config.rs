//! # Spatial Config
//!
//! Static workspace bounds and the initial-condition record of a task. A
//! [`TaskConfig`] is validated once, when the environment is created, and
//! never changes afterwards.

use crate::error::TaskError;
use physics::Vec3;
use serde::{Deserialize, Serialize};

/// Arity of an action: Cartesian hand delta plus one gripper scalar.
pub const ACTION_DIM: usize = 4;
/// Arity of the flat observation: hand position plus feature position.
pub const OBS_DIM: usize = 6;

pub const DEFAULT_ACTION_SCALE: f64 = 1.0 / 100.0;
pub const DEFAULT_FRAME_SKIP: usize = 5;

/// Closed axis-aligned box `[low, high]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub low: Vec3,
    pub high: Vec3,
}

impl Bounds {
    #[must_use]
    pub const fn new(low: Vec3, high: Vec3) -> Self {
        Self { low, high }
    }

    /// Check that both corners are finite and `low <= high` on every axis.
    ///
    /// # Errors
    ///
    /// [`TaskError::NonFinite`] or [`TaskError::InvalidBounds`] naming the box.
    pub fn validate(&self, name: &'static str) -> Result<(), TaskError> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(TaskError::NonFinite(name));
        }
        let axes = [
            ('x', self.low.x, self.high.x),
            ('y', self.low.y, self.high.y),
            ('z', self.low.z, self.high.z),
        ];
        for (axis, low, high) in axes {
            if low > high {
                return Err(TaskError::InvalidBounds { name, axis, low, high });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        (self.low.x..=self.high.x).contains(&p.x)
            && (self.low.y..=self.high.y).contains(&p.y)
            && (self.low.z..=self.high.z).contains(&p.z)
    }

    #[must_use]
    pub fn clip(&self, p: Vec3) -> Vec3 {
        p.clamp(self.low, self.high)
    }

    /// Draw a point uniformly from the box.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec3 {
        let mut axis = |low: f64, high: f64| (low + (high - low) * rng.f64()).clamp(low, high);
        Vec3::new(
            axis(self.low.x, self.high.x),
            axis(self.low.y, self.high.y),
            axis(self.low.z, self.high.z),
        )
    }
}

/// Per-dimension numeric bounds advertised to policy code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxSpace<const N: usize> {
    pub low: [f64; N],
    pub high: [f64; N],
}

impl<const N: usize> BoxSpace<N> {
    #[must_use]
    pub const fn dim(&self) -> usize {
        N
    }

    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == N
            && x
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (lo, hi))| (*lo..=*hi).contains(v))
    }
}

/// Static description of one task variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Hand workspace; mocap targets are clipped into it.
    pub hand: Bounds,
    /// Region the object (or its housing) is sampled from.
    pub obj: Bounds,
    pub goal: Bounds,
    pub default_obj_pos: Vec3,
    pub default_hand_pos: Vec3,
    pub default_goal: Vec3,
    pub max_path_length: usize,
    /// Success when the task distance is at most this.
    pub success_threshold: f64,
    #[serde(default = "default_action_scale")]
    pub action_scale: f64,
    #[serde(default = "default_frame_skip")]
    pub frame_skip: usize,
}

fn default_action_scale() -> f64 {
    DEFAULT_ACTION_SCALE
}

fn default_frame_skip() -> usize {
    DEFAULT_FRAME_SKIP
}

impl TaskConfig {
    /// Reject malformed configurations eagerly.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: inverted or non-finite bounds,
    /// non-finite defaults, a home pose outside the hand workspace, or a
    /// non-positive path length, threshold, action scale or frame skip.
    pub fn validated(self) -> Result<Self, TaskError> {
        self.hand.validate("hand")?;
        self.obj.validate("obj")?;
        self.goal.validate("goal")?;
        for (name, v) in [
            ("default_obj_pos", self.default_obj_pos),
            ("default_hand_pos", self.default_hand_pos),
            ("default_goal", self.default_goal),
        ] {
            if !v.is_finite() {
                return Err(TaskError::NonFinite(name));
            }
        }
        if !self.hand.contains(self.default_hand_pos) {
            return Err(TaskError::InvalidParameter {
                name: "default_hand_pos",
                reason: "outside the hand workspace",
            });
        }
        if self.max_path_length == 0 {
            return Err(TaskError::InvalidParameter { name: "max_path_length", reason: "must be positive" });
        }
        if !(self.success_threshold.is_finite() && self.success_threshold >= 0.0) {
            return Err(TaskError::InvalidParameter {
                name: "success_threshold",
                reason: "must be finite and non-negative",
            });
        }
        if !(self.action_scale.is_finite() && self.action_scale > 0.0) {
            return Err(TaskError::InvalidParameter {
                name: "action_scale",
                reason: "must be finite and positive",
            });
        }
        if self.frame_skip == 0 {
            return Err(TaskError::InvalidParameter { name: "frame_skip", reason: "must be positive" });
        }
        Ok(self)
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// [`TaskError::Config`] on malformed JSON, otherwise any
    /// [`validated`](Self::validated) error.
    pub fn from_json(json: &str) -> Result<Self, TaskError> {
        serde_json::from_str::<Self>(json)?.validated()
    }

    /// `[-1, 1]` on every action component.
    #[must_use]
    pub const fn action_space() -> BoxSpace<ACTION_DIM> {
        BoxSpace { low: [-1.0; ACTION_DIM], high: [1.0; ACTION_DIM] }
    }

    /// Hand workspace followed by the object region.
    #[must_use]
    pub fn observation_space(&self) -> BoxSpace<OBS_DIM> {
        let (hl, hh, ol, oh) = (self.hand.low, self.hand.high, self.obj.low, self.obj.high);
        BoxSpace {
            low: [hl.x, hl.y, hl.z, ol.x, ol.y, ol.z],
            high: [hh.x, hh.y, hh.z, oh.x, oh.y, oh.z],
        }
    }

    #[must_use]
    pub fn goal_space(&self) -> BoxSpace<3> {
        BoxSpace { low: self.goal.low.to_array(), high: self.goal.high.to_array() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Bounds {
        Bounds::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn inverted_bounds_name_the_axis() {
        let b = Bounds::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 0.4, 1.0));
        match b.validate("obj") {
            Err(TaskError::InvalidBounds { name, axis, .. }) => {
                assert_eq!(name, "obj");
                assert_eq!(axis, 'y');
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn degenerate_box_samples_its_point() {
        let p = Vec3::new(0.1, 0.2, 0.05);
        let b = Bounds::new(p, p);
        let mut rng = fastrand::Rng::with_seed(3);
        assert_eq!(b.sample(&mut rng), p);
    }

    #[test]
    fn clip_pulls_points_inside() {
        let clipped = unit().clip(Vec3::new(-1.0, 0.5, 2.0));
        assert_eq!(clipped, Vec3::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn box_space_checks_arity_and_range() {
        let space = TaskConfig::action_space();
        assert_eq!(space.dim(), 4);
        assert!(space.contains(&[1.0, -1.0, 0.0, 0.5]));
        assert!(!space.contains(&[1.0, -1.0, 0.0]));
        assert!(!space.contains(&[1.5, 0.0, 0.0, 0.0]));
    }
}
