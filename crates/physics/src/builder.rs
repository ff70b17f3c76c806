//! # Scene Builder
//!
//! Assembles a [`Workbench`] from bodies, slide joints, sites and contact
//! rules. Names must be unique per kind; handles returned by the builder are
//! valid for the workbench it builds.

use crate::error::PhysicsError;
use crate::types::{BodyId, JointId, SiteId, Vec3};
use crate::workbench::{Actuator, Body, Contact, Joint, Site, Workbench};

/// Default integration sub-step in seconds.
pub const DEFAULT_TIMESTEP: f64 = 0.0025;
/// Opening travel of each finger.
pub const FINGER_TRAVEL: f64 = 0.04;
/// Fingertip sites sit this far below the hand.
pub const FINGERTIP_DROP: f64 = 0.045;

/// Handles to the standard two-finger gripper.
#[derive(Copy, Clone, Debug)]
pub struct Gripper {
    pub hand: BodyId,
    pub right_finger: SiteId,
    pub left_finger: SiteId,
}

#[derive(Default)]
pub struct SceneBuilder {
    bodies: Vec<Body>,
    joints: Vec<Joint>,
    initial_qpos: Vec<f64>,
    sites: Vec<Site>,
    contacts: Vec<Contact>,
    gripper: Option<(Gripper, [Actuator; 2])>,
    timestep: Option<f64>,
}

impl SceneBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Integration sub-step in seconds. Checked by [`SceneBuilder::build`].
    #[must_use]
    pub fn timestep(mut self, dt: f64) -> Self {
        self.timestep = Some(dt);
        self
    }

    /// Add a body at `pos` relative to `parent` (or the world).
    ///
    /// # Errors
    ///
    /// Fails on a duplicate body name or a non-finite position.
    pub fn body(&mut self, name: &str, parent: Option<BodyId>, pos: Vec3) -> Result<BodyId, PhysicsError> {
        if self.bodies.iter().any(|b| b.name == name) {
            return Err(PhysicsError::DuplicateName { kind: "body", name: name.to_owned() });
        }
        if !pos.is_finite() {
            return Err(PhysicsError::NonFinite("body position"));
        }
        self.bodies.push(Body { name: name.to_owned(), parent: parent.map(|p| p.0), pos, joint: None });
        Ok(BodyId(self.bodies.len() - 1))
    }

    /// Give `body` a slide joint along `axis` limited to `[low, high]`,
    /// starting at `initial`.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate joint name, a zero axis, an empty range or a
    /// non-finite initial value.
    pub fn slide_joint(
        &mut self,
        name: &str,
        body: BodyId,
        axis: Vec3,
        (low, high): (f64, f64),
        initial: f64,
    ) -> Result<JointId, PhysicsError> {
        if self.joints.iter().any(|j| j.name == name) {
            return Err(PhysicsError::DuplicateName { kind: "joint", name: name.to_owned() });
        }
        if low.is_nan() || high.is_nan() || low > high {
            return Err(PhysicsError::EmptyRange { low, high });
        }
        if !initial.is_finite() {
            return Err(PhysicsError::NonFinite("initial joint position"));
        }
        let axis = axis.normalized().ok_or(PhysicsError::ZeroAxis)?;
        self.joints.push(Joint { name: name.to_owned(), axis, low, high });
        self.initial_qpos.push(initial.clamp(low, high));
        let id = self.joints.len() - 1;
        self.bodies[body.0].joint = Some(id);
        Ok(JointId(id))
    }

    /// Attach a named site to `body` at local offset `pos`.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate site name or a non-finite offset.
    pub fn site(&mut self, name: &str, body: BodyId, pos: Vec3) -> Result<SiteId, PhysicsError> {
        if self.sites.iter().any(|s| s.name == name) {
            return Err(PhysicsError::DuplicateName { kind: "site", name: name.to_owned() });
        }
        if !pos.is_finite() {
            return Err(PhysicsError::NonFinite("site offset"));
        }
        self.sites.push(Site { name: name.to_owned(), body: body.0, pos });
        Ok(SiteId(self.sites.len() - 1))
    }

    /// Add the mocap-welded hand with two opposed fingers at `hand_pos`.
    ///
    /// Creates bodies `hand`, `rightpad`, `leftpad`, joints `r_close` and
    /// `l_close` (both open at start), and fingertip sites
    /// `rightEndEffector` and `leftEndEffector`.
    ///
    /// # Errors
    ///
    /// Fails if any of those names is already taken.
    pub fn gripper(&mut self, hand_pos: Vec3) -> Result<Gripper, PhysicsError> {
        let hand = self.body("hand", None, hand_pos)?;
        let rightpad = self.body("rightpad", Some(hand), Vec3::ZERO)?;
        let leftpad = self.body("leftpad", Some(hand), Vec3::ZERO)?;
        let r_close = self.slide_joint("r_close", rightpad, Vec3::X, (0.0, FINGER_TRAVEL), FINGER_TRAVEL)?;
        let l_close = self.slide_joint("l_close", leftpad, -Vec3::X, (0.0, FINGER_TRAVEL), FINGER_TRAVEL)?;
        let tip = Vec3::new(0.0, 0.0, -FINGERTIP_DROP);
        let right_finger = self.site("rightEndEffector", rightpad, tip)?;
        let left_finger = self.site("leftEndEffector", leftpad, tip)?;
        let gripper = Gripper { hand, right_finger, left_finger };
        // ctrl[0] = a closes the right finger for a > 0, ctrl[1] = -a closes the left.
        let actuators = [
            Actuator { joint: r_close.0, direction: -1.0 },
            Actuator { joint: l_close.0, direction: 1.0 },
        ];
        self.gripper = Some((gripper, actuators));
        Ok(gripper)
    }

    /// A fingertip (`pusher`) crossing `face` along `joint`'s axis pushes the joint.
    pub fn press(&mut self, joint: JointId, face: SiteId, pusher: SiteId, radius: f64) -> &mut Self {
        self.contacts.push(Contact::Press { joint: joint.0, face: face.0, pusher: pusher.0, radius });
        self
    }

    /// A closed gripper within `radius` of `site` carries `joint` with the hand.
    pub fn grasp(&mut self, joint: JointId, site: SiteId, radius: f64) -> &mut Self {
        self.contacts.push(Contact::Grasp { joint: joint.0, site: site.0, radius });
        self
    }

    /// Finish the scene.
    ///
    /// # Errors
    ///
    /// Fails with [`PhysicsError::MissingPart`] when no gripper was added and
    /// [`PhysicsError::InvalidTimestep`] unless the timestep is finite and
    /// positive.
    pub fn build(self) -> Result<Workbench, PhysicsError> {
        let (gripper, actuators) = self.gripper.ok_or(PhysicsError::MissingPart("gripper"))?;
        let timestep = self.timestep.unwrap_or(DEFAULT_TIMESTEP);
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(timestep));
        }
        Ok(Workbench::from_parts(
            self.bodies,
            self.joints,
            self.initial_qpos,
            self.sites,
            actuators,
            [gripper.right_finger.0, gripper.left_finger.0],
            self.contacts,
            gripper.hand.0,
            timestep,
        ))
    }
}
