//! Built-in workbench scenes for the manipulation tasks.
//!
//! Body placements here are the model defaults; tasks move housings, buttons
//! and pegs at reset time.

use crate::builder::SceneBuilder;
use crate::error::PhysicsError;
use crate::types::Vec3;
use crate::workbench::Workbench;

/// Hand position every scene starts from.
pub const HOME: Vec3 = Vec3::new(0.0, 0.6, 0.2);
/// How far a button can be pushed into its housing.
pub const BUTTON_TRAVEL: f64 = 0.1;
/// How far the peg can slide out of its socket.
pub const PEG_TRAVEL: f64 = 0.3;

const PRESS_RADIUS: f64 = 0.03;
const GRASP_RADIUS: f64 = 0.03;

/// Wall-mounted button in a box housing.
///
/// Bodies `box` and `button`; joint `btnbox_joint` (+y); sites `hole` (end of
/// button travel, on the housing) and `buttonStart` (button face).
///
/// # Errors
///
/// Only fails if the scene definition itself is inconsistent.
pub fn button_press() -> Result<Workbench, PhysicsError> {
    let mut b = SceneBuilder::new();
    let gripper = b.gripper(HOME)?;
    let housing = b.body("box", None, Vec3::new(0.0, 0.9, 0.04))?;
    b.site("hole", housing, Vec3::new(0.0, -0.02, 0.07))?;
    let button = b.body("button", None, Vec3::new(0.0, 0.78, 0.12))?;
    let joint = b.slide_joint("btnbox_joint", button, Vec3::Y, (0.0, BUTTON_TRAVEL), 0.0)?;
    let face = b.site("buttonStart", button, Vec3::ZERO)?;
    b.press(joint, face, gripper.left_finger, PRESS_RADIUS);
    b.build()
}

/// Coffee machine with a front button and a mug.
///
/// Bodies `coffee_machine`, `button`, `mug`; joint `button_joint` (+y); sites
/// `coffee_goal` (end of button travel) and `buttonStart`.
///
/// # Errors
///
/// Only fails if the scene definition itself is inconsistent.
pub fn coffee_button() -> Result<Workbench, PhysicsError> {
    let mut b = SceneBuilder::new();
    let gripper = b.gripper(HOME)?;
    let machine = b.body("coffee_machine", None, Vec3::new(0.0, 0.9, 0.28))?;
    b.site("coffee_goal", machine, Vec3::new(0.0, -0.02, 0.05))?;
    let button = b.body("button", None, Vec3::new(0.0, 0.78, 0.33))?;
    let joint = b.slide_joint("button_joint", button, Vec3::Y, (0.0, BUTTON_TRAVEL), 0.0)?;
    let face = b.site("buttonStart", button, Vec3::ZERO)?;
    b.body("mug", None, Vec3::new(0.0, 0.8, 0.0))?;
    b.press(joint, face, gripper.left_finger, PRESS_RADIUS);
    b.build()
}

/// Peg plugged sideways into a socket box.
///
/// Bodies `box` and `peg`; joint `peg_joint` (+x); sites `hole` (socket
/// mouth, on the box), `pegEnd` (grasp point on the peg) and `goal` (marker).
///
/// # Errors
///
/// Only fails if the scene definition itself is inconsistent.
pub fn peg_unplug_side() -> Result<Workbench, PhysicsError> {
    let mut b = SceneBuilder::new();
    b.gripper(HOME)?;
    let socket = b.body("box", None, Vec3::new(-0.225, 0.6, 0.05))?;
    let hole_local = Vec3::new(0.044, 0.0, 0.131);
    b.site("hole", socket, hole_local)?;
    b.site("goal", socket, hole_local + Vec3::new(0.2, 0.0, 0.0))?;
    let peg = b.body("peg", None, Vec3::new(-0.225, 0.6, 0.05) + hole_local)?;
    let joint = b.slide_joint("peg_joint", peg, Vec3::X, (0.0, PEG_TRAVEL), 0.0)?;
    let end = b.site("pegEnd", peg, Vec3::new(0.05, 0.0, 0.0))?;
    b.grasp(joint, end, GRASP_RADIUS);
    b.build()
}
