//! # State Reducer
//!
//! Reduces simulator state to the end-effector position and the task's
//! feature site. Velocities, orientations and contact data are deliberately
//! not part of the observation.

use crate::config::OBS_DIM;
use physics::{SiteId, Simulator, Vec3};

/// Flat observation `[hand(3), feature(3)]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Observation {
    pub hand: Vec3,
    pub feature: Vec3,
}

impl Observation {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }

    #[must_use]
    pub fn to_array(self) -> [f64; OBS_DIM] {
        bytemuck::cast(self)
    }
}

/// Goal-conditioned view of the same step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ObsDict {
    pub state_observation: Observation,
    pub state_desired_goal: Vec3,
    pub state_achieved_goal: Vec3,
}

#[must_use]
pub fn observe<S: Simulator>(sim: &S, feature: SiteId, state_goal: Vec3) -> ObsDict {
    let achieved = sim.site_xpos(feature);
    ObsDict {
        state_observation: Observation { hand: sim.endeff_pos(), feature: achieved },
        state_desired_goal: state_goal,
        state_achieved_goal: achieved,
    }
}
