#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Manipulation Tasks
//!
//! Fixed-length gripper manipulation episodes with phase-gated shaped
//! rewards, on top of any [`physics::Simulator`].
//!
//! ## Key Components
//!
//! -   **Config:** [`TaskConfig`] holds a task's workspace bounds and
//!     defaults. It is validated once, when an environment is built.
//! -   **Strategy:** [`TaskSpec`] records how a task variant lays its scene
//!     out and measures distances. Built-in variants live in [`tasks`].
//! -   **Episode:** [`ManipEnv`] runs `reset`/`step`, owns the seeded random
//!     source and reports a [`Transition`] per step.
//! -   **Reward:** [`reward`] sums a reach term and a gated progress term.
//!
//! ## Usage
//!
//! ```rust
//! use manip::tasks;
//!
//! let mut env = tasks::make(tasks::BUTTON_PRESS, 7)?;
//! env.set_random_init(false);
//! let obs = env.reset()?;
//! let t = env.step(&[0.0, 1.0, 0.0, -1.0])?;
//! assert!(!t.done);
//! assert_eq!(obs.as_slice().len(), 6);
//! # Ok::<(), manip::TaskError>(())
//! ```

pub mod config;
pub mod episode;
pub mod error;
pub mod observation;
pub mod randomize;
pub mod reward;
pub mod task;
pub mod tasks;

pub use config::{Bounds, BoxSpace, TaskConfig, ACTION_DIM, OBS_DIM};
pub use episode::{EpisodeState, Info, ManipEnv, MarkerUpdate, Status, Transition};
pub use error::TaskError;
pub use observation::{ObsDict, Observation};
pub use task::{FingerRef, Layout, Metric, NormalizerOrigin, PhaseGate, ReachShaping, TaskSpec};
