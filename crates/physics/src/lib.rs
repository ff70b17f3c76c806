#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Workbench Physics
//!
//! The simulator layer underneath the manipulation tasks.
//!
//! This crate draws the line between task logic and physics. Task code only
//! talks to the [`Simulator`] trait, which exposes named-handle lookups,
//! site and body positions, pose mutation, gripper actuation, whole-state
//! get/set and a synchronous `advance`. Anything that can answer those calls
//! can host the tasks.
//!
//! ## Key Components
//!
//! -   **Types:** [`Vec3`] (double precision, `Pod` so observations can be
//!     viewed as flat slices), [`Axis`], the validated handles [`BodyId`],
//!     [`SiteId`], [`JointId`], and [`KinematicState`].
//! -   **Boundary:** the [`Simulator`] trait in [`simulator`].
//! -   **Reference backend:** [`Workbench`], a kinematic stand-in with a
//!     mocap-driven hand, a two-finger gripper and press/grasp contact
//!     rules, assembled with [`SceneBuilder`]. Ready-made scenes live in
//!     [`scenes`].
//!
//! ## Usage
//!
//! ```rust
//! use physics::{scenes, Simulator, Vec3};
//!
//! let mut sim = scenes::button_press()?;
//! let face = sim.site_id("buttonStart").expect("scene has a button");
//! sim.set_mocap_pose(Vec3::new(0.0, 0.7, 0.2), [1.0, 0.0, 1.0, 0.0]);
//! sim.advance(5);
//! assert!(sim.site_xpos(face).is_finite());
//! # Ok::<(), physics::PhysicsError>(())
//! ```

pub mod builder;
pub mod error;
pub mod scenes;
pub mod simulator;
pub mod types;
pub mod workbench;

pub use builder::{Gripper, SceneBuilder};
pub use error::PhysicsError;
pub use simulator::Simulator;
pub use types::{Axis, BodyId, JointId, KinematicState, SiteId, Vec3};
pub use workbench::Workbench;
