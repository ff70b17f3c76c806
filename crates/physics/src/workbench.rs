//! # Kinematic Workbench
//!
//! A small reference implementation of [`Simulator`]: a tree of bodies joined
//! by slide joints, sites hanging off those bodies, a mocap-welded hand with a
//! two-finger gripper, and two contact rules that are enough to drive button
//! and extraction tasks:
//!
//! - **Press**: a fingertip that crosses a button face along the button's
//!   joint axis pushes the joint by the penetration depth.
//! - **Grasp**: a closed gripper whose fingertip midpoint is within reach of a
//!   grasp site carries the object's joint along with the hand.
//!
//! There is no gravity or rigid-body integration here; each sub-step is a
//! first-order kinematic update.

use crate::error::PhysicsError;
use crate::simulator::Simulator;
use crate::types::{BodyId, JointId, KinematicState, SiteId, Vec3};

/// Fraction of the remaining mocap offset the hand covers per sub-step.
pub const HAND_GAIN: f64 = 0.25;
/// Fraction of the remaining control offset a finger covers per sub-step.
pub const FINGER_GAIN: f64 = 0.5;
/// Penetrations deeper than this are treated as the pusher being behind the
/// button rather than pressing it.
pub const PRESS_DEPTH_LIMIT: f64 = 0.05;
/// A finger counts as closed below this fraction of its travel.
pub const CLOSED_FRACTION: f64 = 0.25;

#[derive(Clone, Debug)]
pub(crate) struct Body {
    pub name: String,
    pub parent: Option<usize>,
    pub pos: Vec3,
    pub joint: Option<usize>,
}

#[derive(Clone, Debug)]
pub(crate) struct Joint {
    pub name: String,
    pub axis: Vec3,
    pub low: f64,
    pub high: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct Site {
    pub name: String,
    pub body: usize,
    pub pos: Vec3,
}

/// Gripper actuator: drives one finger joint toward a control-dependent target.
///
/// `direction` maps the control range `[-1, 1]` onto the joint range so that
/// mirrored controls (`[a, -a]`) open or close both fingers together.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Actuator {
    pub joint: usize,
    pub direction: f64,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Contact {
    Press {
        joint: usize,
        face: usize,
        pusher: usize,
        radius: f64,
    },
    Grasp {
        joint: usize,
        site: usize,
        radius: f64,
    },
}

/// Reference kinematic simulator. Build one with [`crate::SceneBuilder`] or
/// take a ready-made scene from [`crate::scenes`].
#[derive(Clone, Debug)]
pub struct Workbench {
    pub(crate) bodies: Vec<Body>,
    pub(crate) joints: Vec<Joint>,
    pub(crate) sites: Vec<Site>,
    pub(crate) actuators: [Actuator; 2],
    pub(crate) fingertips: [usize; 2],
    pub(crate) contacts: Vec<Contact>,
    pub(crate) hand: usize,
    pub(crate) timestep: f64,
    mocap_pos: Vec3,
    mocap_quat: [f64; 4],
    ctrl: [f64; 2],
    qpos: Vec<f64>,
    qvel: Vec<f64>,
    markers: Vec<Option<Vec3>>,
    grasped: Option<usize>,
}

impl Workbench {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        bodies: Vec<Body>,
        joints: Vec<Joint>,
        initial_qpos: Vec<f64>,
        sites: Vec<Site>,
        actuators: [Actuator; 2],
        fingertips: [usize; 2],
        contacts: Vec<Contact>,
        hand: usize,
        timestep: f64,
    ) -> Self {
        let mocap_pos = bodies[hand].pos;
        let n_joints = joints.len();
        let n_sites = sites.len();
        Self {
            bodies,
            joints,
            sites,
            actuators,
            fingertips,
            contacts,
            hand,
            timestep,
            mocap_pos,
            mocap_quat: [1.0, 0.0, 0.0, 0.0],
            ctrl: [0.0; 2],
            qpos: initial_qpos,
            qvel: vec![0.0; n_joints],
            markers: vec![None; n_sites],
            grasped: None,
        }
    }

    /// Simulated time covered by one sub-step.
    #[must_use]
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    #[must_use]
    pub fn mocap_quat(&self) -> [f64; 4] {
        self.mocap_quat
    }

    /// Whether the gripper is currently carrying an object.
    #[must_use]
    pub fn is_grasping(&self) -> bool {
        self.grasped.is_some()
    }

    /// Current gripper control values.
    #[must_use]
    pub fn ctrl(&self) -> [f64; 2] {
        self.ctrl
    }

    fn joint_offset(&self, body: usize) -> Vec3 {
        match self.bodies[body].joint {
            Some(j) => self.joints[j].axis * self.qpos[j],
            None => Vec3::ZERO,
        }
    }

    fn body_world(&self, body: usize) -> Vec3 {
        let b = &self.bodies[body];
        let local = b.pos + self.joint_offset(body);
        match b.parent {
            Some(parent) => self.body_world(parent) + local,
            None => local,
        }
    }

    fn site_world(&self, site: usize) -> Vec3 {
        let s = &self.sites[site];
        self.body_world(s.body) + s.pos
    }

    fn clamp_joint(&self, joint: usize, q: f64) -> f64 {
        let j = &self.joints[joint];
        q.clamp(j.low, j.high)
    }

    fn gripper_closed(&self) -> bool {
        self.actuators.iter().all(|a| {
            let j = &self.joints[a.joint];
            self.qpos[a.joint] - j.low < CLOSED_FRACTION * (j.high - j.low)
        })
    }

    fn fingertip_midpoint(&self) -> Vec3 {
        self.site_world(self.fingertips[0])
            .midpoint(self.site_world(self.fingertips[1]))
    }

    fn substep(&mut self) {
        for (k, act) in self.actuators.iter().enumerate() {
            let j = &self.joints[act.joint];
            let target = j.low + (j.high - j.low) * (1.0 + act.direction * self.ctrl[k]) / 2.0;
            let q = self.qpos[act.joint];
            self.qpos[act.joint] = q + (target - q) * FINGER_GAIN;
        }

        let before = self.bodies[self.hand].pos;
        let after = before + (self.mocap_pos - before) * HAND_GAIN;
        self.bodies[self.hand].pos = after;
        let hand_delta = after - before;

        self.carry(hand_delta);
        self.press();
    }

    fn carry(&mut self, hand_delta: Vec3) {
        let closed = self.gripper_closed();
        match self.grasped {
            Some(_) if !closed => {
                tracing::trace!("gripper opened, releasing object");
                self.grasped = None;
            }
            Some(idx) => {
                if let Contact::Grasp { joint, .. } = self.contacts[idx] {
                    let q = self.qpos[joint] + hand_delta.dot(self.joints[joint].axis);
                    self.qpos[joint] = self.clamp_joint(joint, q);
                }
            }
            None if closed => {
                let mid = self.fingertip_midpoint();
                self.grasped = self.contacts.iter().position(|c| match *c {
                    Contact::Grasp { site, radius, .. } => mid.distance(self.site_world(site)) < radius,
                    Contact::Press { .. } => false,
                });
                if let Some(idx) = self.grasped {
                    tracing::trace!(contact = idx, "object grasped");
                }
            }
            None => {}
        }
    }

    fn press(&mut self) {
        for idx in 0..self.contacts.len() {
            if let Contact::Press { joint, face, pusher, radius } = self.contacts[idx] {
                let axis = self.joints[joint].axis;
                let d = self.site_world(pusher) - self.site_world(face);
                let depth = d.dot(axis);
                let lateral = (d - axis * depth).norm();
                if depth > 0.0 && depth < PRESS_DEPTH_LIMIT && lateral < radius {
                    let q = self.qpos[joint] + depth;
                    self.qpos[joint] = self.clamp_joint(joint, q);
                }
            }
        }
    }
}

fn find(names: impl Iterator<Item = impl AsRef<str>>, name: &str) -> Option<usize> {
    names.into_iter().position(|n| n.as_ref() == name)
}

impl Simulator for Workbench {
    fn body_id(&self, name: &str) -> Option<BodyId> {
        find(self.bodies.iter().map(|b| &b.name), name).map(BodyId)
    }

    fn site_id(&self, name: &str) -> Option<SiteId> {
        find(self.sites.iter().map(|s| &s.name), name).map(SiteId)
    }

    fn joint_id(&self, name: &str) -> Option<JointId> {
        find(self.joints.iter().map(|j| &j.name), name).map(JointId)
    }

    fn advance(&mut self, n_substeps: usize) {
        self.markers.fill(None);
        if n_substeps == 0 {
            return;
        }
        let before = self.qpos.clone();
        for _ in 0..n_substeps {
            self.substep();
        }
        #[allow(clippy::cast_precision_loss)]
        let elapsed = n_substeps as f64 * self.timestep;
        for ((v, q), q0) in self.qvel.iter_mut().zip(&self.qpos).zip(&before) {
            *v = (q - q0) / elapsed;
        }
    }

    fn site_xpos(&self, site: SiteId) -> Vec3 {
        self.markers[site.0].unwrap_or_else(|| self.site_world(site.0))
    }

    fn site_local_pos(&self, site: SiteId) -> Vec3 {
        self.sites[site.0].pos
    }

    fn set_site_xpos(&mut self, site: SiteId, pos: Vec3) {
        self.markers[site.0] = Some(pos);
    }

    fn body_pos(&self, body: BodyId) -> Vec3 {
        self.bodies[body.0].pos
    }

    fn set_body_pos(&mut self, body: BodyId, pos: Vec3) {
        self.bodies[body.0].pos = pos;
        if body.0 == self.hand {
            self.mocap_pos = pos;
        }
    }

    fn body_com(&self, body: BodyId) -> Vec3 {
        self.body_world(body.0)
    }

    fn mocap_pos(&self) -> Vec3 {
        self.mocap_pos
    }

    fn set_mocap_pose(&mut self, pos: Vec3, quat: [f64; 4]) {
        self.mocap_pos = pos;
        self.mocap_quat = quat;
    }

    fn endeff_pos(&self) -> Vec3 {
        self.body_world(self.hand)
    }

    fn set_ctrl(&mut self, ctrl: [f64; 2]) {
        self.ctrl = [ctrl[0].clamp(-1.0, 1.0), ctrl[1].clamp(-1.0, 1.0)];
    }

    fn joint_qpos_addr(&self, joint: JointId) -> usize {
        joint.0
    }

    fn state(&self) -> KinematicState {
        KinematicState {
            qpos: self.qpos.clone(),
            qvel: self.qvel.clone(),
        }
    }

    fn set_state(&mut self, state: &KinematicState) -> Result<(), PhysicsError> {
        let n = self.joints.len();
        if state.qpos.len() != n {
            return Err(PhysicsError::StateShape { field: "qpos", expected: n, actual: state.qpos.len() });
        }
        if state.qvel.len() != n {
            return Err(PhysicsError::StateShape { field: "qvel", expected: n, actual: state.qvel.len() });
        }
        if !state.qpos.iter().chain(&state.qvel).all(|v| v.is_finite()) {
            return Err(PhysicsError::NonFinite("kinematic state"));
        }
        self.qpos.clone_from(&state.qpos);
        self.qvel.clone_from(&state.qvel);
        Ok(())
    }
}
