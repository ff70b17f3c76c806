//! # Simulator Boundary
//!
//! The [`Simulator`] trait is everything the task layer needs from a physics
//! engine: name lookups that hand out validated handles, positional queries,
//! pose mutation, gripper actuation, whole-state get/set and a synchronous
//! advance call. Dynamics, contacts and integration stay behind it.

use crate::error::PhysicsError;
use crate::types::{BodyId, JointId, KinematicState, SiteId, Vec3};

pub trait Simulator {
    fn body_id(&self, name: &str) -> Option<BodyId>;
    fn site_id(&self, name: &str) -> Option<SiteId>;
    fn joint_id(&self, name: &str) -> Option<JointId>;

    /// Advance the simulation by `n_substeps` integration steps.
    fn advance(&mut self, n_substeps: usize);

    /// World position of a site.
    fn site_xpos(&self, site: SiteId) -> Vec3;

    /// Position of a site relative to its parent body, as stored in the model.
    fn site_local_pos(&self, site: SiteId) -> Vec3;

    /// Overwrite the reported world position of a site.
    ///
    /// Used for visual goal markers. The override only lasts until the next
    /// [`advance`](Simulator::advance).
    fn set_site_xpos(&mut self, site: SiteId, pos: Vec3);

    /// Body position relative to its parent, as stored in the model.
    fn body_pos(&self, body: BodyId) -> Vec3;

    fn set_body_pos(&mut self, body: BodyId, pos: Vec3);

    /// World position of a body's centre of mass.
    fn body_com(&self, body: BodyId) -> Vec3;

    fn mocap_pos(&self) -> Vec3;

    fn set_mocap_pose(&mut self, pos: Vec3, quat: [f64; 4]);

    /// World position of the end effector.
    fn endeff_pos(&self) -> Vec3;

    /// Set the gripper actuator controls, one entry per finger.
    fn set_ctrl(&mut self, ctrl: [f64; 2]);

    /// Index of a joint's coordinate inside [`KinematicState::qpos`].
    fn joint_qpos_addr(&self, joint: JointId) -> usize;

    fn state(&self) -> KinematicState;

    /// Replace the full kinematic state.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::StateShape`] when either vector has the wrong
    /// length and [`PhysicsError::NonFinite`] when it carries NaN or infinity.
    fn set_state(&mut self, state: &KinematicState) -> Result<(), PhysicsError>;

    /// Put one joint at `qpos` with zero velocity, leaving the rest of the
    /// state untouched.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`set_state`](Simulator::set_state).
    fn reset_joint(&mut self, joint: JointId, qpos: f64) -> Result<(), PhysicsError> {
        let addr = self.joint_qpos_addr(joint);
        let mut state = self.state();
        state.qpos[addr] = qpos;
        state.qvel[addr] = 0.0;
        self.set_state(&state)
    }
}
