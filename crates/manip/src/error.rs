use physics::PhysicsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("{name} bounds are inverted on axis {axis}: low {low} > high {high}")]
    InvalidBounds {
        name: &'static str,
        axis: char,
        low: f64,
        high: f64,
    },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("invalid {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    #[error("action must have {expected} components, got {actual}")]
    ActionArity { expected: usize, actual: usize },
    #[error("action component {index} is not finite")]
    NonFiniteAction { index: usize },
    #[error("model has no {kind} named `{name}`")]
    MissingName { kind: &'static str, name: &'static str },
    #[error("step called before reset")]
    NotReset,
    #[error("unknown task `{0}`")]
    UnknownTask(String),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
