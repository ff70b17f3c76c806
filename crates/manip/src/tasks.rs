//! # Task Catalogue
//!
//! The three built-in task variants and a name-keyed registry pairing each
//! with its workbench scene.

use crate::config::{Bounds, TaskConfig, DEFAULT_ACTION_SCALE, DEFAULT_FRAME_SKIP};
use crate::episode::ManipEnv;
use crate::error::TaskError;
use crate::task::{FingerRef, Layout, Metric, NormalizerOrigin, PhaseGate, Prop, ReachShaping, TaskSpec};
use physics::{scenes, Axis, Vec3, Workbench};

pub const BUTTON_PRESS: &str = "button-press";
pub const COFFEE_BUTTON: &str = "coffee-button";
pub const PEG_UNPLUG_SIDE: &str = "peg-unplug-side";

/// Every registered task name.
pub const NAMES: [&str; 3] = [BUTTON_PRESS, COFFEE_BUTTON, PEG_UNPLUG_SIDE];

const HAND: Bounds = Bounds::new(Vec3::new(-0.5, 0.4, 0.05), Vec3::new(0.5, 1.0, 0.5));
const HAND_HOME: Vec3 = Vec3::new(0.0, 0.6, 0.2);

/// Press a wall button along +y. Randomized by default.
#[must_use]
pub fn button_press() -> TaskSpec {
    TaskSpec {
        name: BUTTON_PRESS,
        config: TaskConfig {
            hand: HAND,
            obj: Bounds::new(Vec3::new(-0.1, 0.8, 0.05), Vec3::new(0.1, 0.9, 0.05)),
            goal: HAND,
            default_obj_pos: Vec3::new(0.0, 0.9, 0.04),
            default_hand_pos: HAND_HOME,
            default_goal: Vec3::new(0.0, 0.78, 0.12),
            max_path_length: 150,
            success_threshold: 0.02,
            action_scale: DEFAULT_ACTION_SCALE,
            frame_skip: DEFAULT_FRAME_SKIP,
        },
        random_init: true,
        layout: Layout::Button {
            housing: "box",
            button: "button",
            button_joint: "btnbox_joint",
            goal_site: "hole",
            button_offset: Vec3::new(0.0, -0.12, 0.07),
            prop: None,
        },
        feature_site: "buttonStart",
        left_finger_site: "leftEndEffector",
        right_finger_site: "rightEndEffector",
        marker_site: None,
        finger: FingerRef::Left,
        progress: Metric::Axis(Axis::Y),
        normalizer: Metric::Axis(Axis::Y),
        normalizer_origin: NormalizerOrigin::Feature,
        reach: ReachShaping::Direct,
        gate: PhaseGate::PerStep,
    }
}

/// Press the coffee machine's button; the mug follows the machine.
#[must_use]
pub fn coffee_button() -> TaskSpec {
    TaskSpec {
        name: COFFEE_BUTTON,
        config: TaskConfig {
            hand: HAND,
            obj: Bounds::new(Vec3::new(-0.1, 0.8, 0.28), Vec3::new(0.1, 0.9, 0.28)),
            goal: HAND,
            default_obj_pos: Vec3::new(0.0, 0.9, 0.28),
            default_hand_pos: HAND_HOME,
            default_goal: Vec3::new(0.0, 0.78, 0.33),
            max_path_length: 150,
            success_threshold: 0.02,
            action_scale: DEFAULT_ACTION_SCALE,
            frame_skip: DEFAULT_FRAME_SKIP,
        },
        random_init: false,
        layout: Layout::Button {
            housing: "coffee_machine",
            button: "button",
            button_joint: "button_joint",
            goal_site: "coffee_goal",
            button_offset: Vec3::new(0.0, -0.12, 0.05),
            prop: Some(Prop { body: "mug", offset: Vec3::new(0.0, -0.1, -0.28) }),
        },
        feature_site: "buttonStart",
        left_finger_site: "leftEndEffector",
        right_finger_site: "rightEndEffector",
        marker_site: Some("coffee_goal"),
        finger: FingerRef::Left,
        progress: Metric::Axis(Axis::Y),
        normalizer: Metric::Axis(Axis::Y),
        normalizer_origin: NormalizerOrigin::Feature,
        reach: ReachShaping::Direct,
        gate: PhaseGate::PerStep,
    }
}

/// Grasp a peg and pull it sideways out of its socket.
#[must_use]
pub fn peg_unplug_side() -> TaskSpec {
    let region = Bounds::new(Vec3::new(-0.25, 0.6, 0.05), Vec3::new(-0.15, 0.8, 0.05));
    TaskSpec {
        name: PEG_UNPLUG_SIDE,
        config: TaskConfig {
            hand: HAND,
            obj: region,
            goal: region,
            default_obj_pos: Vec3::new(-0.225, 0.6, 0.05),
            default_hand_pos: HAND_HOME,
            default_goal: Vec3::new(-0.225, 0.6, 0.05),
            max_path_length: 200,
            success_threshold: 0.07,
            action_scale: DEFAULT_ACTION_SCALE,
            frame_skip: DEFAULT_FRAME_SKIP,
        },
        random_init: false,
        layout: Layout::Socket {
            socket: "box",
            socket_site: "hole",
            object: "peg",
            object_joint: "peg_joint",
            goal_offset: Vec3::new(0.2, 0.0, 0.0),
        },
        feature_site: "pegEnd",
        left_finger_site: "leftEndEffector",
        right_finger_site: "rightEndEffector",
        marker_site: Some("goal"),
        finger: FingerRef::Midpoint,
        progress: Metric::Planar,
        normalizer: Metric::Euclidean,
        normalizer_origin: NormalizerOrigin::ObjectCom,
        reach: ReachShaping::DescendThenTrack { height_weight: 2.0, close_divisor: 50.0 },
        gate: PhaseGate::Latched,
    }
}

/// Look a task up by name.
///
/// # Errors
///
/// [`TaskError::UnknownTask`] for names outside [`NAMES`].
pub fn by_name(name: &str) -> Result<TaskSpec, TaskError> {
    match name {
        BUTTON_PRESS => Ok(button_press()),
        COFFEE_BUTTON => Ok(coffee_button()),
        PEG_UNPLUG_SIDE => Ok(peg_unplug_side()),
        other => Err(TaskError::UnknownTask(other.to_owned())),
    }
}

/// Fresh workbench scene for a task.
///
/// # Errors
///
/// [`TaskError::UnknownTask`], or a scene construction failure.
pub fn scene(name: &str) -> Result<Workbench, TaskError> {
    let sim = match name {
        BUTTON_PRESS => scenes::button_press()?,
        COFFEE_BUTTON => scenes::coffee_button()?,
        PEG_UNPLUG_SIDE => scenes::peg_unplug_side()?,
        other => return Err(TaskError::UnknownTask(other.to_owned())),
    };
    Ok(sim)
}

/// Environment for a built-in task on its own scene.
///
/// # Errors
///
/// Same as [`by_name`], [`scene`] and [`ManipEnv::new`].
pub fn make(name: &str, seed: u64) -> Result<ManipEnv<Workbench>, TaskError> {
    make_with(by_name(name)?, seed)
}

/// Environment for a (possibly reconfigured) built-in task spec.
///
/// # Errors
///
/// Same as [`scene`] and [`ManipEnv::new`].
pub fn make_with(spec: TaskSpec, seed: u64) -> Result<ManipEnv<Workbench>, TaskError> {
    let sim = scene(spec.name)?;
    ManipEnv::new(spec, sim, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_name() {
        for name in NAMES {
            assert_eq!(by_name(name).unwrap().name, name);
        }
        assert!(matches!(by_name("drawer-open"), Err(TaskError::UnknownTask(n)) if n == "drawer-open"));
    }

    #[test]
    fn builtin_configs_are_valid() {
        for name in NAMES {
            by_name(name).unwrap().config.validated().unwrap();
        }
    }

    #[test]
    fn builtin_specs_bind_to_their_scenes() {
        for name in NAMES {
            let spec = by_name(name).unwrap();
            let sim = scene(name).unwrap();
            spec.bind(&sim).unwrap();
        }
    }
}
